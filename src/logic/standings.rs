//! Standings: ranked aggregates recomputed from completed matches on every call.

use crate::models::{Match, Participant, ParticipantId, Side, Standing, POINTS_PER_WIN};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Rank `participants` over `matches`.
///
/// Only completed, played matches between two of `participants` count (byes carry no
/// sets). Each side is tallied for
/// matches, sets (a set is won with strictly more games) and games. Ranking is by points,
/// set difference, game difference, all descending, then by position in `participants`,
/// so the result is a strict total order and identical input always gives identical output.
pub fn compute_standings(participants: &[Participant], matches: &[Match]) -> Vec<Standing> {
    let index: HashMap<ParticipantId, usize> = participants
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    let mut rows: Vec<Standing> = participants
        .iter()
        .map(|p| Standing {
            participant_id: p.id,
            name: p.name.clone(),
            ..Standing::default()
        })
        .collect();

    for m in matches.iter().filter(|m| m.is_completed() && !m.is_bye) {
        let Some(winner) = m.winner else { continue };
        let seat = |side: Side| m.slot(side).participant().and_then(|id| index.get(&id).copied());
        // Both players must be in scope, or the match does not count for either.
        let (Some(one), Some(two)) = (seat(Side::One), seat(Side::Two)) else {
            continue;
        };
        for (side, i) in [(Side::One, one), (Side::Two, two)] {
            let row = &mut rows[i];
            row.played += 1;
            if side == winner {
                row.won += 1;
            } else {
                row.lost += 1;
            }
            for set in &m.sets {
                let mine = u32::from(set.games(side));
                let theirs = u32::from(set.games(side.opponent()));
                row.games_won += mine;
                row.games_lost += theirs;
                match mine.cmp(&theirs) {
                    Ordering::Greater => row.sets_won += 1,
                    Ordering::Less => row.sets_lost += 1,
                    Ordering::Equal => {}
                }
            }
        }
    }

    for row in &mut rows {
        row.points = row.won * POINTS_PER_WIN;
        row.set_diff = row.sets_won as i32 - row.sets_lost as i32;
        row.game_diff = row.games_won as i32 - row.games_lost as i32;
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| compare(&rows[a], &rows[b]).then(a.cmp(&b)));

    order
        .into_iter()
        .enumerate()
        .map(|(rank, i)| Standing {
            position: rank as u32 + 1,
            ..rows[i].clone()
        })
        .collect()
}

/// Better row first: points, then set difference, then game difference.
fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.set_diff.cmp(&a.set_diff))
        .then(b.game_diff.cmp(&a.game_diff))
}

/// The first `count` participants of ranked standings.
pub fn top(standings: &[Standing], count: usize) -> Vec<ParticipantId> {
    standings.iter().take(count).map(|s| s.participant_id).collect()
}
