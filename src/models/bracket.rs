//! Bracket and Round: the single-elimination tree.

use crate::models::game::{Match, MatchId};
use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Matches sharing a progression depth.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 0-based depth from the first round.
    pub index: u32,
    /// Positional name counted back from the final.
    pub name: String,
    pub matches: Vec<Match>,
}

/// Ordered rounds; round i+1 match j takes the winners of round i matches 2j and 2j+1.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Slot count of the first round (a power of two, or 0 when empty).
    pub size: usize,
    pub rounds: Vec<Round>,
}

impl Bracket {
    /// Bracket with no participants: no rounds, nothing to play.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Human-readable status for views.
    pub fn status(&self) -> &'static str {
        if self.is_empty() {
            "no participants"
        } else if self.champion().is_some() {
            "decided"
        } else {
            "in progress"
        }
    }

    pub fn final_match(&self) -> Option<&Match> {
        self.rounds.last().and_then(|r| r.matches.first())
    }

    /// Winner of the final, once decided.
    pub fn champion(&self) -> Option<ParticipantId> {
        self.final_match().and_then(Match::winner_id)
    }

    /// (round index, match index) of a match id.
    pub fn locate(&self, id: MatchId) -> Option<(usize, usize)> {
        self.rounds.iter().enumerate().find_map(|(r, round)| {
            round
                .matches
                .iter()
                .position(|m| m.id == id)
                .map(|i| (r, i))
        })
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    /// Rebuild the tree from stored knockout matches (any order).
    pub fn from_matches(size: usize, mut matches: Vec<Match>) -> Self {
        matches.sort_by_key(|m| (m.round, m.sequence));
        let total = total_rounds(size);
        let mut rounds: Vec<Round> = (0..total)
            .map(|index| Round {
                index,
                name: round_name(total - index),
                matches: Vec::new(),
            })
            .collect();
        for m in matches {
            if let Some(round) = rounds.get_mut(m.round as usize) {
                round.matches.push(m);
            }
        }
        Self { size, rounds }
    }
}

/// Number of rounds for a first round of `size` slots (log2).
pub fn total_rounds(size: usize) -> u32 {
    if size < 2 {
        0
    } else {
        size.trailing_zeros()
    }
}

/// Name for a round `rounds_to_go` away from the end (1 = Final).
pub fn round_name(rounds_to_go: u32) -> String {
    match rounds_to_go {
        0 | 1 => "Final".to_string(),
        2 => "Semifinal".to_string(),
        3 => "Quarterfinal".to_string(),
        n => format!("Round of {}", 1u64 << n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_are_named_back_from_final() {
        assert_eq!(round_name(1), "Final");
        assert_eq!(round_name(2), "Semifinal");
        assert_eq!(round_name(3), "Quarterfinal");
        assert_eq!(round_name(4), "Round of 16");
        assert_eq!(round_name(6), "Round of 64");
    }

    #[test]
    fn total_rounds_is_log2() {
        assert_eq!(total_rounds(0), 0);
        assert_eq!(total_rounds(2), 1);
        assert_eq!(total_rounds(8), 3);
        assert_eq!(total_rounds(1024), 10);
    }
}
