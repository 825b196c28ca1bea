//! Participant data structure.

use crate::models::competition::CompetitionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in match slots and lookups).
pub type ParticipantId = Uuid;

/// A registered participant. The display name is resolved once at registration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub competition_id: CompetitionId,
    pub name: String,
    /// Seed rank (1 = top seed). Unseeded entrants are drawn after all seeds.
    pub seed: Option<u32>,
    /// Position in registration order; the stable fallback for every ranking.
    pub registration_index: u32,
    pub registered_at: DateTime<Utc>,
}

impl Participant {
    /// Create a new participant with the given name and optional seed.
    pub fn new(
        competition_id: CompetitionId,
        name: impl Into<String>,
        seed: Option<u32>,
        registration_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition_id,
            name: name.into(),
            seed,
            registration_index,
            registered_at: Utc::now(),
        }
    }
}

/// Registration payload: what the caller knows before an id is assigned.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    #[serde(default)]
    pub seed: Option<u32>,
}
