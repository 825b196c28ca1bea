//! Data structures for the competition engine: participants, matches, brackets, groups, state.

mod bracket;
mod competition;
mod error;
mod game;
mod group;
mod participant;
mod standing;

pub use bracket::{round_name, total_rounds, Bracket, Round};
pub use competition::{CompetitionId, CompetitionMode, CompetitionState, DrawOrder, Phase};
pub use error::{CompetitionError, ProgressionError, ScoreError, StorageError, StructureError};
pub use game::{
    BestOf, Match, MatchFormat, MatchId, MatchStatus, SetScore, Side, Slot, Stage, TiebreakScore,
};
pub use group::{group_name, Group, GroupSizing};
pub use participant::{NewParticipant, Participant, ParticipantId};
pub use standing::{Standing, StandingsScope, POINTS_PER_WIN};
