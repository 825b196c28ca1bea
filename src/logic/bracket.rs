//! Knockout construction: single-elimination bracket padded with byes.

use crate::models::{
    round_name, total_rounds, Bracket, CompetitionId, Match, ParticipantId, Round, Side, Slot,
    Stage, StructureError,
};

/// Largest supported first round.
pub const MAX_BRACKET_SIZE: usize = 1024;

/// Build a single-elimination bracket for `participants` (in draw order).
///
/// 1. `size` = next power of two of max(capacity, participant count), at least 2.
/// 2. Pad the draw with BYEs up to `size`; slot 2i meets slot 2i+1 in round-1 match i.
/// 3. A pair with a BYE is decided immediately (a real participant advances; two BYEs
///    advance a BYE).
/// 4. Each later round pairs the previous round's winner slots; undecided ones are TBD.
///
/// No participants gives an empty bracket rather than an error.
pub fn build_bracket(
    competition_id: CompetitionId,
    participants: &[ParticipantId],
    capacity: usize,
) -> Result<Bracket, StructureError> {
    if participants.is_empty() {
        return Ok(Bracket::empty());
    }
    if capacity == 0 || capacity > MAX_BRACKET_SIZE || participants.len() > MAX_BRACKET_SIZE {
        return Err(StructureError::InvalidCapacity {
            capacity: capacity.max(participants.len()),
            max: MAX_BRACKET_SIZE,
        });
    }

    let size = capacity.max(participants.len()).next_power_of_two().max(2);
    let total = total_rounds(size);

    let mut slots: Vec<Slot> = participants.iter().copied().map(Slot::Participant).collect();
    slots.resize(size, Slot::Bye);

    let first: Vec<Match> = slots
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| bracket_match(competition_id, 0, i, pair[0], pair[1]))
        .collect();

    let mut rounds = vec![Round {
        index: 0,
        name: round_name(total),
        matches: first,
    }];

    for index in 1..total {
        let prev = &rounds[index as usize - 1].matches;
        let matches: Vec<Match> = prev
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                let p1 = pair[0].winner_slot().unwrap_or(Slot::Tbd);
                let p2 = pair[1].winner_slot().unwrap_or(Slot::Tbd);
                bracket_match(competition_id, index, i, p1, p2)
            })
            .collect();
        rounds.push(Round {
            index,
            name: round_name(total - index),
            matches,
        });
    }

    Ok(Bracket { size, rounds })
}

fn bracket_match(competition_id: CompetitionId, round: u32, sequence: usize, p1: Slot, p2: Slot) -> Match {
    let mut m = Match::new(competition_id, Stage::Knockout, round, sequence as u32, p1, p2);
    m.resolve_bye();
    m
}

/// Where the winner of round `round`, match `index` goes: (round, index, side).
pub fn next_slot(round: usize, index: usize) -> (usize, usize, Side) {
    let side = if index % 2 == 0 { Side::One } else { Side::Two };
    (round + 1, index / 2, side)
}
