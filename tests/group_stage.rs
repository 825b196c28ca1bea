//! Integration tests for group allocation and round-robin fixtures.

use club_competition::logic::{group_matches, round_robin_matches};
use club_competition::{
    allocate_groups, round_robin_fixtures, GroupSizing, MatchStatus, ParticipantId, Stage,
    StructureError,
};
use std::collections::HashSet;
use uuid::Uuid;

fn ids(n: usize) -> Vec<ParticipantId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

#[test]
fn group_of_four_has_six_fixtures() {
    let members = ids(4);
    let fixtures = round_robin_fixtures(&members);
    assert_eq!(fixtures.len(), 6);

    let pairs: HashSet<(ParticipantId, ParticipantId)> = fixtures
        .iter()
        .map(|&(a, b)| if a < b { (a, b) } else { (b, a) })
        .collect();
    assert_eq!(pairs.len(), 6);
    assert!(fixtures.iter().all(|(a, b)| a != b));
}

#[test]
fn fixtures_are_reproducible() {
    let members = ids(5);
    assert_eq!(round_robin_fixtures(&members), round_robin_fixtures(&members));
    assert_eq!(round_robin_fixtures(&members)[0], (members[0], members[1]));
    assert_eq!(round_robin_fixtures(&members).len(), 10);
}

#[test]
fn groups_are_balanced() {
    let players = ids(10);
    let groups = allocate_groups(&players, GroupSizing::Count(3), 1).unwrap();
    let sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
    assert_eq!(sizes, vec![4, 3, 3]);
    assert_eq!(groups[0].name, "Group A");
    assert_eq!(groups[2].name, "Group C");

    let all: HashSet<ParticipantId> = groups.iter().flat_map(|g| g.members.iter().copied()).collect();
    assert_eq!(all.len(), 10);
    // Dealt in draw order: first three players head groups A, B, C.
    assert_eq!(groups[1].members[0], players[1]);
}

#[test]
fn target_size_determines_group_count() {
    let groups = allocate_groups(&ids(10), GroupSizing::Size(4), 2).unwrap();
    assert_eq!(groups.len(), 3);
    assert!(groups.iter().all(|g| g.advancement_count == 2));
}

#[test]
fn rejects_too_few_participants() {
    assert_eq!(
        allocate_groups(&ids(1), GroupSizing::Count(1), 1),
        Err(StructureError::InsufficientParticipants {
            found: 1,
            required: 2
        })
    );
    assert_eq!(
        allocate_groups(&ids(5), GroupSizing::Count(3), 1),
        Err(StructureError::InsufficientParticipants {
            found: 5,
            required: 6
        })
    );
}

#[test]
fn rejects_bad_group_settings() {
    assert_eq!(
        allocate_groups(&ids(6), GroupSizing::Count(0), 1),
        Err(StructureError::InvalidGroupCount { groups: 0 })
    );
    assert_eq!(
        allocate_groups(&ids(7), GroupSizing::Count(2), 4),
        Err(StructureError::InvalidAdvancement {
            advancement_count: 4,
            smallest_group: 3
        })
    );
    assert!(matches!(
        allocate_groups(&ids(6), GroupSizing::Count(2), 0),
        Err(StructureError::InvalidAdvancement { .. })
    ));
}

#[test]
fn group_matches_are_scheduled_per_group() {
    let cid = Uuid::new_v4();
    let groups = allocate_groups(&ids(8), GroupSizing::Count(2), 2).unwrap();
    let matches = group_matches(cid, &groups[1]);
    assert_eq!(matches.len(), 6);
    assert!(matches.iter().all(|m| m.stage == Stage::Group(1)));
    assert!(matches.iter().all(|m| m.status == MatchStatus::Scheduled && m.is_playable()));
    let sequences: Vec<u32> = matches.iter().map(|m| m.sequence).collect();
    assert_eq!(sequences, (0..6).collect::<Vec<u32>>());
}

#[test]
fn round_robin_covers_whole_field() {
    let matches = round_robin_matches(Uuid::new_v4(), &ids(6));
    assert_eq!(matches.len(), 15);
    assert!(matches.iter().all(|m| m.stage == Stage::RoundRobin));
}
