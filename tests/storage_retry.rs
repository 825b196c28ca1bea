//! Integration tests for retrying phase changes after the state write fails.

use club_competition::{
    CompetitionId, CompetitionMode, CompetitionState, GroupSizing, Match, MatchFormat, MatchId,
    MatchStore, MemoryStore, NewParticipant, Orchestrator, Participant, ParticipantId,
    ParticipantStore, Phase, SetScore, Stage, StateStore, StorageError,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// `MemoryStore` whose next state write can be made to fail once.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_next_state: AtomicBool,
}

impl FlakyStore {
    fn fail_next_state_write(&self) {
        self.fail_next_state.store(true, Ordering::SeqCst);
    }
}

impl ParticipantStore for FlakyStore {
    fn list_participants(&self, competition: CompetitionId) -> Result<Vec<Participant>, StorageError> {
        self.inner.list_participants(competition)
    }

    fn add_participant(&self, participant: Participant) -> Result<(), StorageError> {
        self.inner.add_participant(participant)
    }

    fn remove_participant(&self, id: ParticipantId) -> Result<(), StorageError> {
        self.inner.remove_participant(id)
    }
}

impl MatchStore for FlakyStore {
    fn list_matches(&self, competition: CompetitionId, scope: Option<Stage>) -> Result<Vec<Match>, StorageError> {
        self.inner.list_matches(competition, scope)
    }

    fn get_match(&self, id: MatchId) -> Result<Match, StorageError> {
        self.inner.get_match(id)
    }

    fn upsert_matches(&self, matches: Vec<Match>) -> Result<Vec<Match>, StorageError> {
        self.inner.upsert_matches(matches)
    }

    fn replace_matches(
        &self,
        competition: CompetitionId,
        scope: Option<Stage>,
        matches: Vec<Match>,
    ) -> Result<Vec<Match>, StorageError> {
        self.inner.replace_matches(competition, scope, matches)
    }
}

impl StateStore for FlakyStore {
    fn get_state(&self, competition: CompetitionId) -> Result<CompetitionState, StorageError> {
        self.inner.get_state(competition)
    }

    fn set_state(&self, state: CompetitionState) -> Result<(), StorageError> {
        if self.fail_next_state.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Unavailable("down".to_string()));
        }
        self.inner.set_state(state)
    }
}

fn competition_with_players(n: usize) -> (Orchestrator<FlakyStore>, CompetitionId) {
    let engine = Orchestrator::new(FlakyStore::default());
    let state = engine
        .create_competition("Autumn Open", MatchFormat::default())
        .unwrap();
    for i in 0..n {
        let entry = NewParticipant {
            name: format!("P{i}"),
            seed: None,
        };
        engine.register_participant(state.id, entry).unwrap();
    }
    (engine, state.id)
}

#[test]
fn knockout_start_can_be_retried() {
    let (engine, id) = competition_with_players(4);
    let mode = CompetitionMode::Knockout { capacity: None };

    engine.store().fail_next_state_write();
    let err = engine.start_competition(id, mode).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(engine.get_state(id).unwrap().phase, Phase::Registration);

    let state = engine.start_competition(id, mode).unwrap();
    assert_eq!(state.phase, Phase::Knockout);

    let bracket = engine.get_bracket(id).unwrap();
    let sizes: Vec<usize> = bracket.rounds.iter().map(|r| r.matches.len()).collect();
    assert_eq!(sizes, vec![2, 1]);
    assert_eq!(engine.list_matches(id).unwrap().len(), 3);
}

#[test]
fn round_robin_start_can_be_retried() {
    let (engine, id) = competition_with_players(3);

    engine.store().fail_next_state_write();
    assert!(engine.start_competition(id, CompetitionMode::RoundRobin).is_err());
    engine.start_competition(id, CompetitionMode::RoundRobin).unwrap();

    let fixtures = engine.list_matches(id).unwrap();
    assert_eq!(fixtures.len(), 3);
    for m in &fixtures {
        engine
            .submit_result(m.id, &[SetScore::new(6, 1), SetScore::new(6, 1)])
            .unwrap();
    }
    assert_eq!(engine.get_state(id).unwrap().phase, Phase::Completed);
}

#[test]
fn advance_to_knockout_can_be_retried() {
    let (engine, id) = competition_with_players(8);
    let mode = CompetitionMode::GroupsThenKnockout {
        sizing: GroupSizing::Count(2),
        advancement_count: 2,
    };
    engine.start_competition(id, mode).unwrap();
    for m in engine.list_matches(id).unwrap() {
        engine
            .submit_result(m.id, &[SetScore::new(6, 3), SetScore::new(6, 3)])
            .unwrap();
    }

    engine.store().fail_next_state_write();
    let err = engine.advance_phase(id).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(engine.get_state(id).unwrap().phase, Phase::Groups);

    let state = engine.advance_phase(id).unwrap();
    assert_eq!(state.phase, Phase::Knockout);
    let knockout = engine.store().list_matches(id, Some(Stage::Knockout)).unwrap();
    assert_eq!(knockout.len(), 3);
    // Group results survive the replacement.
    assert_eq!(engine.list_matches(id).unwrap().len(), 12 + 3);
}
