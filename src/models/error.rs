//! Error types for validation, construction, progression and storage.

use crate::models::competition::{CompetitionId, Phase};
use crate::models::game::{MatchId, SetScore};
use crate::models::participant::ParticipantId;
use serde::Serialize;
use thiserror::Error;

/// A proposed match score broke a tennis scoring rule. `set` is the 1-based set number.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum ScoreError {
    #[error("No sets entered")]
    NoSetsEntered,
    #[error("Too many sets: {entered} entered for a best-of-{best_of} match")]
    TooManySets { entered: usize, best_of: u8 },
    #[error("Set {set} ({score}): a set needs at least 6 games for the winner")]
    InsufficientGames { set: usize, score: SetScore },
    #[error("Set {set} ({score}): a set must be won by 2 games, or 7-6 on a tiebreak")]
    InsufficientMargin { set: usize, score: SetScore },
    #[error("Set {set} ({score}): a set ends at 6 games (or 7-5, 7-6)")]
    SetTooLong { set: usize, score: SetScore },
    #[error("Set {set} ({score}): a 7-6 set needs the tiebreak score")]
    MissingTiebreak { set: usize, score: SetScore },
    #[error("Set {set} ({score}): tiebreak must be won by the set winner with 7+ points and a 2-point lead")]
    InvalidTiebreak { set: usize, score: SetScore },
    #[error("Set {set} ({score}): only a 7-6 set has a tiebreak")]
    UnexpectedTiebreak { set: usize, score: SetScore },
    #[error("Set {set} ({score}) was played after the match was already decided")]
    SetAfterMatchDecided { set: usize, score: SetScore },
    #[error("Match incomplete: {needed} sets needed to win, score is {sets_1}-{sets_2}")]
    MatchIncomplete { needed: u8, sets_1: u8, sets_2: u8 },
}

/// Bracket or group construction could not proceed. Nothing is persisted.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum StructureError {
    #[error("Not enough participants: {found} found, at least {required} needed")]
    InsufficientParticipants { found: usize, required: usize },
    #[error("Invalid capacity {capacity}: must be between 1 and {max}")]
    InvalidCapacity { capacity: usize, max: usize },
    #[error("Invalid group count {groups}")]
    InvalidGroupCount { groups: usize },
    #[error("Invalid advancement count {advancement_count}: groups have at least {smallest_group} members")]
    InvalidAdvancement {
        advancement_count: usize,
        smallest_group: usize,
    },
}

/// A result could not be applied to the bracket.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum ProgressionError {
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Match {0} already has a different result; use the edit path to change it")]
    AlreadyCompleted(MatchId),
    #[error("Match {0} is still waiting for an opponent")]
    MatchNotReady(MatchId),
    #[error("Match {match_id} cannot be edited: later match {blocked_by} has already been played")]
    ResultLocked { match_id: MatchId, blocked_by: MatchId },
}

/// Store collaborator failures. Callers may retry.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Concurrent write conflict on match {match_id}, retry")]
    Conflict { match_id: MatchId },
    #[error("Competition {0} not found")]
    CompetitionNotFound(CompetitionId),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),
}

/// Errors returned by the competition operations.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "class", content = "detail")]
pub enum CompetitionError {
    #[error(transparent)]
    Validation(#[from] ScoreError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Not enough participants to start: {found} registered, at least 2 needed")]
    NotEnoughParticipants { found: usize },
    #[error("Groups not finished: {pending} match(es) still to play")]
    GroupsNotFinished { pending: usize },
    #[error("{pending} match(es) still to play")]
    MatchesPending { pending: usize },
    #[error("Cannot {action} while in {phase}")]
    InvalidPhaseTransition { phase: Phase, action: String },
    #[error("Match {0} does not belong to the active phase")]
    MatchNotActive(MatchId),
    #[error("Group {0} not found")]
    GroupNotFound(usize),
    #[error("A participant with this name already exists")]
    DuplicateParticipantName,
    #[error("Participant name must not be empty")]
    EmptyParticipantName,
    #[error("Invalid participant import: {0}")]
    InvalidImport(String),
}

impl CompetitionError {
    pub(crate) fn invalid_phase(phase: Phase, action: &str) -> Self {
        CompetitionError::InvalidPhaseTransition {
            phase,
            action: action.to_string(),
        }
    }

    /// Storage conflicts and outages can be retried; everything else is a definite rejection.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompetitionError::Storage(StorageError::Conflict { .. } | StorageError::Unavailable(_))
        )
    }

    /// Something named by the caller does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CompetitionError::Storage(
                StorageError::CompetitionNotFound(_)
                    | StorageError::MatchNotFound(_)
                    | StorageError::ParticipantNotFound(_)
            ) | CompetitionError::Progression(ProgressionError::MatchNotFound(_))
                | CompetitionError::GroupNotFound(_)
        )
    }
}
