//! Knockout progression: move a decided match's winner into the next round.

use crate::logic::bracket::next_slot;
use crate::models::{Bracket, MatchId, ProgressionError, SetScore, Side};

/// Record a played result for a bracket match and advance the winner.
///
/// Returns the ids of every match that changed (the match itself, the next-round match
/// receiving the winner, and any bye auto-resolutions after it). Resubmitting the identical
/// result is a no-op and returns an empty list; a different result for a decided match is
/// rejected with `AlreadyCompleted`.
pub fn record_result(
    bracket: &mut Bracket,
    match_id: MatchId,
    winner: Side,
    sets: Vec<SetScore>,
) -> Result<Vec<MatchId>, ProgressionError> {
    let (r, i) = bracket
        .locate(match_id)
        .ok_or(ProgressionError::MatchNotFound(match_id))?;

    let m = &mut bracket.rounds[r].matches[i];
    if m.is_completed() {
        if m.same_result(winner, &sets) {
            return Ok(Vec::new());
        }
        return Err(ProgressionError::AlreadyCompleted(match_id));
    }
    if !m.is_playable() {
        return Err(ProgressionError::MatchNotReady(match_id));
    }
    m.complete(winner, sets);

    let mut changed = vec![match_id];
    propagate(bracket, r, i, &mut changed);
    Ok(changed)
}

/// Replace the result of a decided bracket match (the explicit correction path).
///
/// A changed winner is rewritten through later bye resolutions. Fails with `ResultLocked`
/// when a later match on the winner's path has already been played.
pub fn edit_result(
    bracket: &mut Bracket,
    match_id: MatchId,
    winner: Side,
    sets: Vec<SetScore>,
) -> Result<Vec<MatchId>, ProgressionError> {
    let (r, i) = bracket
        .locate(match_id)
        .ok_or(ProgressionError::MatchNotFound(match_id))?;

    let m = &bracket.rounds[r].matches[i];
    if !m.is_completed() {
        return record_result(bracket, match_id, winner, sets);
    }
    if m.is_bye || !m.is_playable() {
        return Err(ProgressionError::MatchNotReady(match_id));
    }
    if m.same_result(winner, &sets) {
        return Ok(Vec::new());
    }

    let winner_changes = m.winner != Some(winner);
    if winner_changes {
        if let Some(blocked_by) = played_downstream(bracket, r, i) {
            return Err(ProgressionError::ResultLocked {
                match_id,
                blocked_by,
            });
        }
    }

    bracket.rounds[r].matches[i].complete(winner, sets);
    let mut changed = vec![match_id];
    if winner_changes {
        propagate(bracket, r, i, &mut changed);
    }
    Ok(changed)
}

/// First match on the path from (r, i) towards the final that was decided by play.
/// Bye resolutions on the way are skipped over since they can be recomputed.
fn played_downstream(bracket: &Bracket, mut r: usize, mut i: usize) -> Option<MatchId> {
    while r + 1 < bracket.rounds.len() {
        let (nr, ni, _) = next_slot(r, i);
        let dest = &bracket.rounds[nr].matches[ni];
        if !dest.is_completed() {
            return None;
        }
        if !dest.is_bye {
            return Some(dest.id);
        }
        r = nr;
        i = ni;
    }
    None
}

/// Write the winner of (r, i) into its next-round slot, following bye auto-resolutions.
fn propagate(bracket: &mut Bracket, mut r: usize, mut i: usize, changed: &mut Vec<MatchId>) {
    while r + 1 < bracket.rounds.len() {
        let winner = bracket.rounds[r].matches[i].winner_slot().unwrap_or_default();
        let (nr, ni, side) = next_slot(r, i);
        let dest = &mut bracket.rounds[nr].matches[ni];
        if dest.is_completed() && dest.is_bye {
            dest.reopen();
        }
        *dest.slot_mut(side) = winner;
        if !changed.contains(&dest.id) {
            changed.push(dest.id);
        }
        if !dest.resolve_bye() {
            break;
        }
        log::debug!("Match {} decided by bye", dest.id);
        r = nr;
        i = ni;
    }
}
