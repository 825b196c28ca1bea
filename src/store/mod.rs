//! Storage collaborators: participant, match and competition-state stores.
//!
//! The engine only talks to persistence through these traits. `MemoryStore` is the
//! in-process implementation used by the web binary and the tests.

mod memory;

pub use memory::{MemoryStore, StoreSnapshot};

use crate::models::{
    CompetitionId, CompetitionState, Match, MatchId, Participant, ParticipantId, Stage, StorageError,
};

pub trait ParticipantStore: Send + Sync {
    /// Participants of a competition in registration order.
    fn list_participants(&self, competition: CompetitionId) -> Result<Vec<Participant>, StorageError>;

    fn add_participant(&self, participant: Participant) -> Result<(), StorageError>;

    fn remove_participant(&self, id: ParticipantId) -> Result<(), StorageError>;
}

pub trait MatchStore: Send + Sync {
    /// Matches of a competition, optionally limited to one stage, ordered by stage, round
    /// and sequence.
    fn list_matches(&self, competition: CompetitionId, scope: Option<Stage>) -> Result<Vec<Match>, StorageError>;

    fn get_match(&self, id: MatchId) -> Result<Match, StorageError>;

    /// Write several matches atomically. Each match's `version` must equal the stored one
    /// (0 for a new match) or the whole batch fails with `StorageError::Conflict`. Returns
    /// the stored copies with their new versions.
    fn upsert_matches(&self, matches: Vec<Match>) -> Result<Vec<Match>, StorageError>;

    /// Drop every match of `competition` in `scope` (all stages when `None`) and store
    /// `matches` in their place, as one write. Returns the stored copies.
    fn replace_matches(
        &self,
        competition: CompetitionId,
        scope: Option<Stage>,
        matches: Vec<Match>,
    ) -> Result<Vec<Match>, StorageError>;

    /// Single-match form of `upsert_matches`.
    fn upsert_match(&self, m: Match) -> Result<Match, StorageError> {
        let id = m.id;
        self.upsert_matches(vec![m])?
            .into_iter()
            .next()
            .ok_or(StorageError::MatchNotFound(id))
    }
}

pub trait StateStore: Send + Sync {
    fn get_state(&self, competition: CompetitionId) -> Result<CompetitionState, StorageError>;

    fn set_state(&self, state: CompetitionState) -> Result<(), StorageError>;
}

/// Everything the orchestrator needs from persistence.
pub trait CompetitionStore: ParticipantStore + MatchStore + StateStore {}

impl<T: ParticipantStore + MatchStore + StateStore> CompetitionStore for T {}
