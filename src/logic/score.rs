//! Score validation: checks a proposed result against tennis set and match rules.

use crate::models::{MatchFormat, ScoreError, SetScore, Side, TiebreakScore};
use serde::Serialize;

/// A result that passed validation: played sets only, plus who won.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidatedScore {
    pub sets: Vec<SetScore>,
    pub winner: Side,
    pub sets_1: u8,
    pub sets_2: u8,
}

/// Validate the proposed sets of one match.
///
/// 1. Drop unplayed (0-0) sets.
/// 2. Reject an empty result, or more played sets than the format allows.
/// 3. Check every set on its own (games, margin, tiebreak).
/// 4. Count sets: one side must reach `ceil(best_of / 2)`, and no set may follow that point.
///
/// Error set numbers refer to positions in the list as entered.
pub fn validate_score(sets: &[SetScore], format: MatchFormat) -> Result<ValidatedScore, ScoreError> {
    let played: Vec<(usize, SetScore)> = sets
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_played())
        .map(|(i, s)| (i + 1, *s))
        .collect();

    if played.is_empty() {
        return Err(ScoreError::NoSetsEntered);
    }
    let best_of = format.best_of.sets();
    if played.len() > best_of as usize {
        return Err(ScoreError::TooManySets {
            entered: played.len(),
            best_of,
        });
    }

    for &(number, set) in &played {
        validate_set(number, set, format.advantage_sets)?;
    }

    let needed = format.best_of.sets_to_win();
    let (mut sets_1, mut sets_2) = (0u8, 0u8);
    let mut winner = None;
    for &(number, set) in &played {
        if winner.is_some() {
            return Err(ScoreError::SetAfterMatchDecided { set: number, score: set });
        }
        match set.leader() {
            Some(Side::One) => sets_1 += 1,
            Some(Side::Two) => sets_2 += 1,
            None => {}
        }
        if sets_1 == needed {
            winner = Some(Side::One);
        } else if sets_2 == needed {
            winner = Some(Side::Two);
        }
    }

    match winner {
        Some(winner) => Ok(ValidatedScore {
            sets: played.into_iter().map(|(_, s)| s).collect(),
            winner,
            sets_1,
            sets_2,
        }),
        None => Err(ScoreError::MatchIncomplete {
            needed,
            sets_1,
            sets_2,
        }),
    }
}

/// Check a single played set.
///
/// Regular sets end at 6 games with a 2-game lead, 7-5, or 7-6 on a tiebreak. With
/// `advantage_sets` a set may run on past 7 games until one side leads by exactly 2.
pub fn validate_set(number: usize, set: SetScore, advantage_sets: bool) -> Result<(), ScoreError> {
    let hi = set.games_1.max(set.games_2);
    let lo = set.games_1.min(set.games_2);

    if hi < 6 {
        return Err(ScoreError::InsufficientGames { set: number, score: set });
    }

    if hi == 7 && lo == 6 {
        let tiebreak = set
            .tiebreak
            .ok_or(ScoreError::MissingTiebreak { set: number, score: set })?;
        if !tiebreak_is_valid(tiebreak, set.leader()) {
            return Err(ScoreError::InvalidTiebreak { set: number, score: set });
        }
        return Ok(());
    }

    let margin = hi - lo;
    if margin < 2 {
        return Err(ScoreError::InsufficientMargin { set: number, score: set });
    }
    let finished_in_time = if advantage_sets {
        hi == 6 || margin == 2
    } else {
        hi == 6 || (hi == 7 && lo == 5)
    };
    if !finished_in_time {
        return Err(ScoreError::SetTooLong { set: number, score: set });
    }
    if set.tiebreak.is_some() {
        return Err(ScoreError::UnexpectedTiebreak { set: number, score: set });
    }
    Ok(())
}

/// A finished tiebreak: first to 7 with a 2-point lead, won by the set winner.
fn tiebreak_is_valid(tb: TiebreakScore, set_winner: Option<Side>) -> bool {
    let hi = tb.points_1.max(tb.points_2);
    let lo = tb.points_1.min(tb.points_2);
    let finished = hi >= 7 && hi - lo >= 2 && (hi == 7 || hi - lo == 2);
    let tb_winner = if tb.points_1 > tb.points_2 {
        Side::One
    } else {
        Side::Two
    };
    finished && set_winner == Some(tb_winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiebreak_must_be_finished() {
        let tb = |a, b| TiebreakScore { points_1: a, points_2: b };
        assert!(tiebreak_is_valid(tb(7, 3), Some(Side::One)));
        assert!(tiebreak_is_valid(tb(12, 10), Some(Side::One)));
        assert!(!tiebreak_is_valid(tb(7, 6), Some(Side::One)));
        assert!(!tiebreak_is_valid(tb(6, 4), Some(Side::One)));
        assert!(!tiebreak_is_valid(tb(11, 7), Some(Side::One)));
        assert!(!tiebreak_is_valid(tb(3, 7), Some(Side::One)));
    }
}
