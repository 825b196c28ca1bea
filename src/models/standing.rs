//! Standing: one ranked row, derived from completed matches.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Points for a match win. Losses score nothing; tennis has no draws.
pub const POINTS_PER_WIN: u32 = 2;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based rank.
    pub position: u32,
    pub participant_id: ParticipantId,
    pub name: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: u32,
    pub set_diff: i32,
    pub game_diff: i32,
}

/// Which population standings are computed over.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum StandingsScope {
    /// Every participant, every group or round-robin match.
    #[default]
    Overall,
    Group(usize),
}
