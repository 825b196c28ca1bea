//! In-memory store with optimistic match versions and JSON snapshots.

use crate::models::{
    CompetitionId, CompetitionState, Match, MatchId, Participant, ParticipantId, Stage, StorageError,
};
use crate::store::{MatchStore, ParticipantStore, StateStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    states: HashMap<CompetitionId, CompetitionState>,
    /// Per competition, in registration order.
    participants: HashMap<CompetitionId, Vec<Participant>>,
    matches: HashMap<MatchId, Match>,
}

/// Everything held by a `MemoryStore`, for export and reload.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub states: Vec<CompetitionState>,
    pub participants: Vec<Participant>,
    pub matches: Vec<Match>,
}

/// Thread-safe store; each call reads or writes under one lock, so readers never see a
/// half-written batch.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("store lock poisoned".to_string())
}

fn stage_key(stage: Stage) -> (u8, usize) {
    match stage {
        Stage::Group(i) => (0, i),
        Stage::RoundRobin => (1, 0),
        Stage::Knockout => (2, 0),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StorageError> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StorageError> {
        self.inner.write().map_err(|_| poisoned())
    }

    /// Copy of everything stored, in a stable order.
    pub fn snapshot(&self) -> Result<StoreSnapshot, StorageError> {
        let g = self.read()?;
        let mut states: Vec<CompetitionState> = g.states.values().cloned().collect();
        states.sort_by_key(|s| (s.created_at, s.id));
        let participants = states
            .iter()
            .flat_map(|s| g.participants.get(&s.id).cloned().unwrap_or_default())
            .collect();
        let mut matches: Vec<Match> = g.matches.values().cloned().collect();
        matches.sort_by_key(|m| (m.competition_id, stage_key(m.stage), m.round, m.sequence));
        Ok(StoreSnapshot {
            states,
            participants,
            matches,
        })
    }

    /// Store pre-loaded from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut inner = Inner::default();
        for s in snapshot.states {
            inner.states.insert(s.id, s);
        }
        for p in snapshot.participants {
            inner.participants.entry(p.competition_id).or_default().push(p);
        }
        for m in snapshot.matches {
            inner.matches.insert(m.id, m);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        let snapshot = self.snapshot()?;
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StorageError::Unavailable(format!("Failed to serialize: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)
            .map_err(|e| StorageError::Unavailable(format!("Failed to parse: {}", e)))?;
        Ok(Self::from_snapshot(snapshot))
    }
}

impl ParticipantStore for MemoryStore {
    fn list_participants(&self, competition: CompetitionId) -> Result<Vec<Participant>, StorageError> {
        let g = self.read()?;
        if !g.states.contains_key(&competition) {
            return Err(StorageError::CompetitionNotFound(competition));
        }
        Ok(g.participants.get(&competition).cloned().unwrap_or_default())
    }

    fn add_participant(&self, participant: Participant) -> Result<(), StorageError> {
        let mut g = self.write()?;
        if !g.states.contains_key(&participant.competition_id) {
            return Err(StorageError::CompetitionNotFound(participant.competition_id));
        }
        g.participants
            .entry(participant.competition_id)
            .or_default()
            .push(participant);
        Ok(())
    }

    fn remove_participant(&self, id: ParticipantId) -> Result<(), StorageError> {
        let mut g = self.write()?;
        for list in g.participants.values_mut() {
            if let Some(idx) = list.iter().position(|p| p.id == id) {
                list.remove(idx);
                return Ok(());
            }
        }
        Err(StorageError::ParticipantNotFound(id))
    }
}

impl MatchStore for MemoryStore {
    fn list_matches(&self, competition: CompetitionId, scope: Option<Stage>) -> Result<Vec<Match>, StorageError> {
        let g = self.read()?;
        if !g.states.contains_key(&competition) {
            return Err(StorageError::CompetitionNotFound(competition));
        }
        let mut matches: Vec<Match> = g
            .matches
            .values()
            .filter(|m| m.competition_id == competition)
            .filter(|m| scope.map_or(true, |s| m.stage == s))
            .cloned()
            .collect();
        matches.sort_by_key(|m| (stage_key(m.stage), m.round, m.sequence));
        Ok(matches)
    }

    fn get_match(&self, id: MatchId) -> Result<Match, StorageError> {
        self.read()?
            .matches
            .get(&id)
            .cloned()
            .ok_or(StorageError::MatchNotFound(id))
    }

    fn upsert_matches(&self, matches: Vec<Match>) -> Result<Vec<Match>, StorageError> {
        let mut g = self.write()?;
        for m in &matches {
            let stored_version = g.matches.get(&m.id).map_or(0, |s| s.version);
            if stored_version != m.version {
                log::warn!(
                    "Rejected write to match {} at version {} (stored {})",
                    m.id,
                    m.version,
                    stored_version
                );
                return Err(StorageError::Conflict { match_id: m.id });
            }
        }
        let mut written = Vec::with_capacity(matches.len());
        for mut m in matches {
            m.version += 1;
            g.matches.insert(m.id, m.clone());
            written.push(m);
        }
        Ok(written)
    }

    fn replace_matches(
        &self,
        competition: CompetitionId,
        scope: Option<Stage>,
        matches: Vec<Match>,
    ) -> Result<Vec<Match>, StorageError> {
        let mut g = self.write()?;
        if !g.states.contains_key(&competition) {
            return Err(StorageError::CompetitionNotFound(competition));
        }
        let before = g.matches.len();
        g.matches
            .retain(|_, m| m.competition_id != competition || !scope.map_or(true, |s| m.stage == s));
        let dropped = before - g.matches.len();
        if dropped > 0 {
            log::warn!("Replaced {} stale matches of competition {}", dropped, competition);
        }
        let mut written = Vec::with_capacity(matches.len());
        for mut m in matches {
            m.version = 1;
            g.matches.insert(m.id, m.clone());
            written.push(m);
        }
        Ok(written)
    }
}

impl StateStore for MemoryStore {
    fn get_state(&self, competition: CompetitionId) -> Result<CompetitionState, StorageError> {
        self.read()?
            .states
            .get(&competition)
            .cloned()
            .ok_or(StorageError::CompetitionNotFound(competition))
    }

    fn set_state(&self, state: CompetitionState) -> Result<(), StorageError> {
        self.write()?.states.insert(state.id, state);
        Ok(())
    }
}
