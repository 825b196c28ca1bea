//! Competition state, phases and start modes.

use crate::models::game::MatchFormat;
use crate::models::group::{Group, GroupSizing};
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a competition.
pub type CompetitionId = Uuid;

/// Current phase of the competition. Transitions only move forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Taking registrations; participants can still be removed.
    #[default]
    Registration,
    /// Group stage: round-robin inside each group.
    Groups,
    /// Single-elimination bracket.
    Knockout,
    /// Whole-field round-robin championship.
    RoundRobin,
    /// Finished; results are final.
    Completed,
}

impl Phase {
    /// Phases in which match results are accepted.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Groups | Phase::Knockout | Phase::RoundRobin)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Registration => "registration",
            Phase::Groups => "groups",
            Phase::Knockout => "knockout",
            Phase::RoundRobin => "round_robin",
            Phase::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Format chosen when the competition starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CompetitionMode {
    /// Straight single elimination. Capacity defaults to the participant count.
    Knockout {
        #[serde(default)]
        capacity: Option<usize>,
    },
    /// Group stage, then the top `advancement_count` of each group into a knockout.
    GroupsThenKnockout {
        sizing: GroupSizing,
        advancement_count: usize,
    },
    /// Everybody plays everybody once.
    RoundRobin,
}

impl CompetitionMode {
    /// Phase entered on start.
    pub fn first_phase(self) -> Phase {
        match self {
            CompetitionMode::Knockout { .. } => Phase::Knockout,
            CompetitionMode::GroupsThenKnockout { .. } => Phase::Groups,
            CompetitionMode::RoundRobin => Phase::RoundRobin,
        }
    }
}

/// How entrants are ordered into the draw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DrawOrder {
    /// Seeds first (ascending), then unseeded in registration order.
    #[default]
    Seeded,
    /// Seeds first, then unseeded shuffled with a reproducible seed.
    Random { seed: u64 },
}

/// Full persisted competition state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CompetitionState {
    pub id: CompetitionId,
    pub name: String,
    pub format: MatchFormat,
    pub phase: Phase,
    /// Set on start.
    pub mode: Option<CompetitionMode>,
    /// Participant order frozen at start.
    pub draw: Vec<ParticipantId>,
    /// Active groups (group stage and afterwards).
    pub groups: Vec<Group>,
    /// First-round slot count once a bracket exists.
    pub bracket_size: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompetitionState {
    /// Create a new competition in Registration with no participants.
    pub fn new(name: impl Into<String>, format: MatchFormat) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            phase: Phase::Registration,
            mode: None,
            draw: Vec::new(),
            groups: Vec::new(),
            bracket_size: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    /// Move to `phase`, stamping the update time.
    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }
}
