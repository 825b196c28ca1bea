//! Tennis club competition engine: library with models, pure competition logic, stores and
//! the orchestrator that drives a competition through its phases.

pub mod config;
pub mod logic;
pub mod models;
pub mod orchestrator;
pub mod store;

pub use config::AppConfig;
pub use logic::{
    allocate_groups, build_bracket, compute_standings, edit_result, record_result,
    round_robin_fixtures, validate_score, ValidatedScore,
};
pub use models::{
    BestOf, Bracket, CompetitionError, CompetitionId, CompetitionMode, CompetitionState, DrawOrder,
    Group, GroupSizing, Match, MatchFormat, MatchId, MatchStatus, NewParticipant, Participant,
    ParticipantId, Phase, ProgressionError, Round, ScoreError, SetScore, Side, Slot, Stage,
    Standing, StandingsScope, StorageError, StructureError,
};
pub use orchestrator::Orchestrator;
pub use store::{CompetitionStore, MatchStore, MemoryStore, ParticipantStore, StateStore};
