//! Match, set scores, slots and match format for tennis singles.

use crate::models::competition::CompetitionId;
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match (player 1 or player 2).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// One participant position in a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "participant_id")]
pub enum Slot {
    /// Waiting on the winner of an earlier match.
    #[default]
    Tbd,
    /// Synthetic padding opponent; the other side advances without playing.
    Bye,
    Participant(ParticipantId),
}

impl Slot {
    pub fn participant(self) -> Option<ParticipantId> {
        match self {
            Slot::Participant(id) => Some(id),
            _ => None,
        }
    }
}

/// Which part of the competition a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum Stage {
    /// Round-robin fixture inside group `index`.
    Group(usize),
    /// Fixture of a whole-field round-robin championship.
    RoundRobin,
    /// Single-elimination bracket match.
    Knockout,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

/// Tiebreak points, recorded for a set that finished 7-6.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TiebreakScore {
    pub points_1: u8,
    pub points_2: u8,
}

/// Games won by each side in one set, from player 1's point of view.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub games_1: u8,
    pub games_2: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiebreak: Option<TiebreakScore>,
}

impl SetScore {
    pub fn new(games_1: u8, games_2: u8) -> Self {
        Self {
            games_1,
            games_2,
            tiebreak: None,
        }
    }

    /// A 7-6 (or 6-7) set with its tiebreak points.
    pub fn with_tiebreak(games_1: u8, games_2: u8, points_1: u8, points_2: u8) -> Self {
        Self {
            games_1,
            games_2,
            tiebreak: Some(TiebreakScore { points_1, points_2 }),
        }
    }

    /// A set counts as played once either side has a game.
    pub fn is_played(&self) -> bool {
        self.games_1 > 0 || self.games_2 > 0
    }

    /// Side with strictly more games, if any.
    pub fn leader(&self) -> Option<Side> {
        match self.games_1.cmp(&self.games_2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Games for the given side.
    pub fn games(&self, side: Side) -> u8 {
        match side {
            Side::One => self.games_1,
            Side::Two => self.games_2,
        }
    }
}

impl fmt::Display for SetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.games_1, self.games_2)?;
        if let Some(tb) = self.tiebreak {
            write!(f, "({}-{})", tb.points_1, tb.points_2)?;
        }
        Ok(())
    }
}

/// Number of sets a match is played over.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BestOf {
    One,
    #[default]
    Three,
    Five,
}

impl BestOf {
    pub fn sets(self) -> u8 {
        match self {
            BestOf::One => 1,
            BestOf::Three => 3,
            BestOf::Five => 5,
        }
    }

    /// Sets one side must win: ceil(n / 2).
    pub fn sets_to_win(self) -> u8 {
        self.sets() / 2 + 1
    }
}

impl TryFrom<u8> for BestOf {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BestOf::One),
            3 => Ok(BestOf::Three),
            5 => Ok(BestOf::Five),
            other => Err(format!("best of {} is not supported (use 1, 3 or 5)", other)),
        }
    }
}

impl From<BestOf> for u8 {
    fn from(b: BestOf) -> u8 {
        b.sets()
    }
}

/// Scoring rules a competition's matches are validated against.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchFormat {
    #[serde(default)]
    pub best_of: BestOf,
    /// Allow sets played out past 7 games until a two-game lead (e.g. 8-6, 12-10).
    #[serde(default)]
    pub advantage_sets: bool,
}

/// A single match between two slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub competition_id: CompetitionId,
    pub stage: Stage,
    /// Knockout: 0-based depth from the first round. Group and round-robin fixtures use 0.
    pub round: u32,
    /// Position within the round (knockout) or fixture order (groups, round-robin).
    pub sequence: u32,
    pub player_1: Slot,
    pub player_2: Slot,
    /// Played sets, empty until completed (and for byes).
    pub sets: Vec<SetScore>,
    /// None if not yet decided.
    pub winner: Option<Side>,
    pub status: MatchStatus,
    /// Decided by a bye rather than played.
    pub is_bye: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Store revision this copy was read at (optimistic concurrency).
    pub version: u64,
}

impl Match {
    pub fn new(
        competition_id: CompetitionId,
        stage: Stage,
        round: u32,
        sequence: u32,
        player_1: Slot,
        player_2: Slot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition_id,
            stage,
            round,
            sequence,
            player_1,
            player_2,
            sets: Vec::new(),
            winner: None,
            status: MatchStatus::Scheduled,
            is_bye: false,
            completed_at: None,
            version: 0,
        }
    }

    pub fn slot(&self, side: Side) -> Slot {
        match side {
            Side::One => self.player_1,
            Side::Two => self.player_2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::One => &mut self.player_1,
            Side::Two => &mut self.player_2,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Slot that won, once decided. A BYE-vs-BYE pair "wins" a BYE.
    pub fn winner_slot(&self) -> Option<Slot> {
        self.winner.map(|side| self.slot(side))
    }

    /// Winning participant, if decided and not a BYE.
    pub fn winner_id(&self) -> Option<ParticipantId> {
        self.winner_slot().and_then(Slot::participant)
    }

    /// Side the participant plays on, if they are in this match.
    pub fn side_of(&self, participant: ParticipantId) -> Option<Side> {
        if self.player_1 == Slot::Participant(participant) {
            Some(Side::One)
        } else if self.player_2 == Slot::Participant(participant) {
            Some(Side::Two)
        } else {
            None
        }
    }

    /// Both sides are real participants, so the match can be played.
    pub fn is_playable(&self) -> bool {
        self.player_1.participant().is_some() && self.player_2.participant().is_some()
    }

    /// Same decided outcome (winner and sets); bookkeeping fields are ignored.
    pub fn same_result(&self, winner: Side, sets: &[SetScore]) -> bool {
        self.winner == Some(winner) && self.sets == sets
    }

    /// Record a played result.
    pub fn complete(&mut self, winner: Side, sets: Vec<SetScore>) {
        self.sets = sets;
        self.winner = Some(winner);
        self.status = MatchStatus::Completed;
        self.is_bye = false;
        self.completed_at = Some(Utc::now());
    }

    /// If at least one slot is a BYE and the other is resolved, decide the match without play.
    /// Returns whether the match was resolved.
    pub fn resolve_bye(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        let winner = match (self.player_1, self.player_2) {
            (Slot::Bye, Slot::Tbd) | (Slot::Tbd, Slot::Bye) => return false,
            (Slot::Participant(_), Slot::Bye) | (Slot::Bye, Slot::Bye) => Side::One,
            (Slot::Bye, Slot::Participant(_)) => Side::Two,
            _ => return false,
        };
        self.sets.clear();
        self.winner = Some(winner);
        self.status = MatchStatus::Completed;
        self.is_bye = true;
        self.completed_at = Some(Utc::now());
        true
    }

    /// Clear a bye resolution so a changed slot can be re-evaluated.
    pub fn reopen(&mut self) {
        self.sets.clear();
        self.winner = None;
        self.status = MatchStatus::Scheduled;
        self.is_bye = false;
        self.completed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knockout(p1: Slot, p2: Slot) -> Match {
        Match::new(Uuid::nil(), Stage::Knockout, 0, 0, p1, p2)
    }

    #[test]
    fn bye_resolves_to_real_side() {
        let a = Uuid::new_v4();
        let mut m = knockout(Slot::Bye, Slot::Participant(a));
        assert!(m.resolve_bye());
        assert_eq!(m.winner, Some(Side::Two));
        assert_eq!(m.winner_id(), Some(a));
        assert!(m.is_bye);
    }

    #[test]
    fn bye_against_tbd_waits() {
        let mut m = knockout(Slot::Tbd, Slot::Bye);
        assert!(!m.resolve_bye());
        assert_eq!(m.status, MatchStatus::Scheduled);
    }

    #[test]
    fn double_bye_advances_a_bye() {
        let mut m = knockout(Slot::Bye, Slot::Bye);
        assert!(m.resolve_bye());
        assert_eq!(m.winner_slot(), Some(Slot::Bye));
        assert_eq!(m.winner_id(), None);
    }

    #[test]
    fn best_of_rejects_even_counts() {
        assert!(BestOf::try_from(2).is_err());
        assert_eq!(BestOf::try_from(5), Ok(BestOf::Five));
        assert_eq!(BestOf::Five.sets_to_win(), 3);
        assert_eq!(BestOf::One.sets_to_win(), 1);
    }
}
