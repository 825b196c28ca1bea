//! Group stage: allocation into balanced groups and round-robin fixtures.

use crate::models::{
    group_name, CompetitionId, Group, GroupSizing, Match, ParticipantId, Slot, Stage,
    StructureError,
};

/// Split the draw into groups.
///
/// Participants are dealt one at a time across the groups (first to group A, second to B,
/// ...), so group sizes differ by at most one. Every group needs at least 2 members and
/// `advancement_count` must fit within the smallest group.
pub fn allocate_groups(
    participants: &[ParticipantId],
    sizing: GroupSizing,
    advancement_count: usize,
) -> Result<Vec<Group>, StructureError> {
    let n = participants.len();
    if n < 2 {
        return Err(StructureError::InsufficientParticipants {
            found: n,
            required: 2,
        });
    }
    let count = sizing.group_count(n);
    if count == 0 {
        return Err(StructureError::InvalidGroupCount { groups: count });
    }
    if n < 2 * count {
        return Err(StructureError::InsufficientParticipants {
            found: n,
            required: 2 * count,
        });
    }
    let smallest_group = n / count;
    if advancement_count == 0 || advancement_count > smallest_group {
        return Err(StructureError::InvalidAdvancement {
            advancement_count,
            smallest_group,
        });
    }

    let mut groups: Vec<Group> = (0..count)
        .map(|index| Group {
            index,
            name: group_name(index),
            members: Vec::with_capacity(n / count + 1),
            advancement_count,
        })
        .collect();
    for (i, &p) in participants.iter().enumerate() {
        groups[i % count].members.push(p);
    }
    Ok(groups)
}

/// All unordered pairs of `members`, ordered by (i, j) member index with i < j.
pub fn round_robin_fixtures(members: &[ParticipantId]) -> Vec<(ParticipantId, ParticipantId)> {
    let n = members.len();
    let mut fixtures = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            fixtures.push((members[i], members[j]));
        }
    }
    fixtures
}

/// Scheduled matches for one group.
pub fn group_matches(competition_id: CompetitionId, group: &Group) -> Vec<Match> {
    fixtures_to_matches(competition_id, Stage::Group(group.index), &group.members)
}

/// Scheduled matches for a whole-field round-robin.
pub fn round_robin_matches(competition_id: CompetitionId, participants: &[ParticipantId]) -> Vec<Match> {
    fixtures_to_matches(competition_id, Stage::RoundRobin, participants)
}

fn fixtures_to_matches(competition_id: CompetitionId, stage: Stage, members: &[ParticipantId]) -> Vec<Match> {
    round_robin_fixtures(members)
        .into_iter()
        .enumerate()
        .map(|(seq, (a, b))| {
            Match::new(
                competition_id,
                stage,
                0,
                seq as u32,
                Slot::Participant(a),
                Slot::Participant(b),
            )
        })
        .collect()
}

/// Knockout draw from group qualifiers (`qualifiers[g]` = group g's advancing members, best first).
///
/// Qualifiers are listed by rank, then group (A1, B1, A2, B2, ...), and the list is folded
/// best-against-worst so that sequential bracket pairing gives A1 v B2, B1 v A2.
pub fn knockout_draw(qualifiers: &[Vec<ParticipantId>]) -> Vec<ParticipantId> {
    let depth = qualifiers.iter().map(Vec::len).max().unwrap_or(0);
    let ranked: Vec<ParticipantId> = (0..depth)
        .flat_map(|rank| qualifiers.iter().filter_map(move |g| g.get(rank).copied()))
        .collect();

    let mut draw = Vec::with_capacity(ranked.len());
    let (mut lo, mut hi) = (0usize, ranked.len());
    while lo < hi {
        draw.push(ranked[lo]);
        lo += 1;
        if lo < hi {
            hi -= 1;
            draw.push(ranked[hi]);
        }
    }
    draw
}
