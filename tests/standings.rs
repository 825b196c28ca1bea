//! Integration tests for standings: aggregation, tie-breaks and idempotence.

use club_competition::{
    compute_standings, validate_score, Match, MatchFormat, Participant, SetScore, Slot, Stage,
};
use uuid::Uuid;

fn field(n: usize) -> Vec<Participant> {
    let cid = Uuid::new_v4();
    (0..n)
        .map(|i| Participant::new(cid, format!("P{}", i + 1), None, i as u32))
        .collect()
}

/// A completed group match between `p1` and `p2` with games from p1's side.
fn played(p1: &Participant, p2: &Participant, games: &[(u8, u8)]) -> Match {
    let sets: Vec<SetScore> = games.iter().map(|&(a, b)| SetScore::new(a, b)).collect();
    let score = validate_score(&sets, MatchFormat::default()).unwrap();
    let mut m = Match::new(
        p1.competition_id,
        Stage::Group(0),
        0,
        0,
        Slot::Participant(p1.id),
        Slot::Participant(p2.id),
    );
    m.complete(score.winner, score.sets);
    m
}

fn three_way_tie() -> (Vec<Participant>, Vec<Match>) {
    let players = field(3);
    let (p1, p2, p3) = (&players[0], &players[1], &players[2]);
    let matches = vec![
        played(p1, p2, &[(6, 2), (6, 3)]),
        played(p2, p3, &[(6, 0), (6, 0)]),
        played(p3, p1, &[(6, 4), (4, 6), (6, 2)]),
    ];
    (players, matches)
}

#[test]
fn three_way_tie_resolved_by_sets_then_games() {
    let (players, matches) = three_way_tie();
    let standings = compute_standings(&players, &matches);

    let order: Vec<&str> = standings.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(order, vec!["P1", "P2", "P3"]);
    assert!(standings.iter().all(|s| s.points == 2 && s.won == 1 && s.lost == 1));

    let p1 = &standings[0];
    assert_eq!((p1.sets_won, p1.sets_lost, p1.set_diff), (3, 2, 1));
    assert_eq!((p1.games_won, p1.games_lost, p1.game_diff), (24, 21, 3));

    let p2 = &standings[1];
    assert_eq!((p2.sets_won, p2.sets_lost, p2.set_diff), (2, 2, 0));
    assert_eq!((p2.games_won, p2.games_lost, p2.game_diff), (17, 12, 5));

    let p3 = &standings[2];
    assert_eq!((p3.sets_won, p3.sets_lost, p3.set_diff), (2, 3, -1));
    assert_eq!((p3.games_won, p3.games_lost, p3.game_diff), (16, 24, -8));

    let positions: Vec<u32> = standings.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[test]
fn recomputing_gives_identical_output() {
    let (players, matches) = three_way_tie();
    let first = serde_json::to_string(&compute_standings(&players, &matches)).unwrap();
    let second = serde_json::to_string(&compute_standings(&players, &matches)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn points_rank_before_differences() {
    let players = field(3);
    let (p1, p2, p3) = (&players[0], &players[1], &players[2]);
    // P3 wins twice narrowly; P1 wins once heavily.
    let matches = vec![
        played(p3, p1, &[(7, 5), (7, 5)]),
        played(p3, p2, &[(7, 5), (7, 5)]),
        played(p1, p2, &[(6, 0), (6, 0)]),
    ];
    let standings = compute_standings(&players, &matches);
    assert_eq!(standings[0].participant_id, p3.id);
    assert_eq!(standings[0].points, 4);
    assert_eq!(standings[1].participant_id, p1.id);
    assert_eq!(standings[2].participant_id, p2.id);
}

#[test]
fn unplayed_field_keeps_registration_order() {
    let players = field(4);
    let mut scheduled = played(&players[3], &players[0], &[(6, 0), (6, 0)]);
    scheduled.reopen();
    let standings = compute_standings(&players, &[scheduled]);
    let ids: Vec<_> = standings.iter().map(|s| s.participant_id).collect();
    assert_eq!(ids, players.iter().map(|p| p.id).collect::<Vec<_>>());
    assert!(standings.iter().all(|s| s.played == 0 && s.points == 0));
}

#[test]
fn byes_and_outsiders_are_ignored() {
    let players = field(2);
    let outsider = field(1).remove(0);
    let mut bye = Match::new(
        players[0].competition_id,
        Stage::Knockout,
        0,
        0,
        Slot::Participant(players[0].id),
        Slot::Bye,
    );
    assert!(bye.resolve_bye());
    let other = played(&outsider, &players[1], &[(6, 1), (6, 1)]);

    let standings = compute_standings(&players, &[bye, other]);
    assert_eq!(standings.len(), 2);
    assert_eq!(standings[0].participant_id, players[0].id);
    assert!(standings.iter().all(|s| s.played == 0 && s.lost == 0 && s.games_lost == 0));
}

#[test]
fn match_against_an_outsider_counts_for_nobody() {
    let players = field(2);
    let outsider = field(1).remove(0);
    let matches = vec![
        played(&players[1], &outsider, &[(6, 0), (6, 0)]),
        played(&players[0], &players[1], &[(6, 4), (6, 4)]),
    ];
    let standings = compute_standings(&players, &matches);
    assert_eq!(standings[0].participant_id, players[0].id);
    assert_eq!(standings[1].won, 0);
    assert_eq!((standings[1].played, standings[1].games_won), (1, 8));
}
