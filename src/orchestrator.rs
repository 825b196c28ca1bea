//! Competition lifecycle: registration, start, results, phase changes and read views.
//!
//! Every write runs under an exclusive per-competition lock (read state, compute, write),
//! so two submissions for the same competition never interleave. Different competitions
//! never share a lock. Reads (`get_bracket`, `get_standings`) take no lock and work from
//! whatever consistent snapshot the store returns.

use crate::logic::{
    allocate_groups, build_bracket, compute_standings, draw_order, edit_result, group_matches,
    is_duplicate_name, knockout_draw, normalize_name, parse_participants_csv, record_result,
    round_robin_matches, top, validate_score,
};
use crate::models::{
    Bracket, CompetitionError, CompetitionId, CompetitionMode, CompetitionState, DrawOrder, Match,
    MatchFormat, MatchId, NewParticipant, Participant, ParticipantId, Phase, ProgressionError,
    SetScore, Stage, Standing, StandingsScope, StorageError,
};
use crate::store::CompetitionStore;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};

/// Drives competitions stored in `S`.
pub struct Orchestrator<S> {
    store: S,
    locks: Mutex<HashMap<CompetitionId, Arc<Mutex<()>>>>,
}

fn lock_error() -> CompetitionError {
    StorageError::Unavailable("competition lock poisoned".to_string()).into()
}

impl<S: CompetitionStore> Orchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The exclusive lock for one competition (created on first use).
    fn competition_lock(&self, id: CompetitionId) -> Result<Arc<Mutex<()>>, CompetitionError> {
        let mut locks = self.locks.lock().map_err(|_| lock_error())?;
        Ok(locks.entry(id).or_default().clone())
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Create a new competition in Registration.
    pub fn create_competition(
        &self,
        name: &str,
        format: MatchFormat,
    ) -> Result<CompetitionState, CompetitionError> {
        let state = CompetitionState::new(name.trim(), format);
        self.store.set_state(state.clone())?;
        info!("Created competition {} ({})", state.name, state.id);
        Ok(state)
    }

    pub fn get_state(&self, id: CompetitionId) -> Result<CompetitionState, CompetitionError> {
        Ok(self.store.get_state(id)?)
    }

    pub fn list_participants(&self, id: CompetitionId) -> Result<Vec<Participant>, CompetitionError> {
        Ok(self.store.list_participants(id)?)
    }

    pub fn list_matches(&self, id: CompetitionId) -> Result<Vec<Match>, CompetitionError> {
        Ok(self.store.list_matches(id, None)?)
    }

    /// Register one participant (Registration only). Names are unique, case-insensitive.
    pub fn register_participant(
        &self,
        id: CompetitionId,
        entry: NewParticipant,
    ) -> Result<Participant, CompetitionError> {
        let mut added = self.register_all(id, vec![entry])?;
        added.pop().ok_or(CompetitionError::EmptyParticipantName)
    }

    /// Register every row of a `name,seed` CSV file, or none of them.
    pub fn import_participants_csv<R: Read>(
        &self,
        id: CompetitionId,
        reader: R,
    ) -> Result<Vec<Participant>, CompetitionError> {
        let entries = parse_participants_csv(reader)?;
        self.register_all(id, entries)
    }

    fn register_all(
        &self,
        id: CompetitionId,
        entries: Vec<NewParticipant>,
    ) -> Result<Vec<Participant>, CompetitionError> {
        let lock = self.competition_lock(id)?;
        let _guard = lock.lock().map_err(|_| lock_error())?;

        let state = self.store.get_state(id)?;
        if state.phase != Phase::Registration {
            return Err(CompetitionError::invalid_phase(state.phase, "register participants"));
        }
        let existing = self.store.list_participants(id)?;
        let mut next_index = existing
            .iter()
            .map(|p| p.registration_index + 1)
            .max()
            .unwrap_or(0);

        // Validate the whole batch before writing any of it.
        let mut added: Vec<Participant> = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = normalize_name(&entry.name)?;
            let names = existing.iter().chain(added.iter()).map(|p| p.name.as_str());
            if is_duplicate_name(&name, names) {
                return Err(CompetitionError::DuplicateParticipantName);
            }
            added.push(Participant::new(id, name, entry.seed, next_index));
            next_index += 1;
        }
        for p in &added {
            self.store.add_participant(p.clone())?;
            debug!("Registered {} in competition {}", p.name, id);
        }
        Ok(added)
    }

    /// Remove a participant before the competition starts.
    pub fn remove_participant(
        &self,
        id: CompetitionId,
        participant_id: ParticipantId,
    ) -> Result<(), CompetitionError> {
        let lock = self.competition_lock(id)?;
        let _guard = lock.lock().map_err(|_| lock_error())?;

        let state = self.store.get_state(id)?;
        if state.phase != Phase::Registration {
            return Err(CompetitionError::invalid_phase(state.phase, "remove participants"));
        }
        if !self
            .store
            .list_participants(id)?
            .iter()
            .any(|p| p.id == participant_id)
        {
            return Err(StorageError::ParticipantNotFound(participant_id).into());
        }
        self.store.remove_participant(participant_id)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase transitions
    // ------------------------------------------------------------------

    /// Start the competition in `mode` with the default seeded draw.
    pub fn start_competition(
        &self,
        id: CompetitionId,
        mode: CompetitionMode,
    ) -> Result<CompetitionState, CompetitionError> {
        self.start_competition_with_draw(id, mode, DrawOrder::Seeded)
    }

    /// Start the competition: freeze the field, build groups or the bracket, enter the
    /// first phase. Nothing is written unless construction succeeds.
    pub fn start_competition_with_draw(
        &self,
        id: CompetitionId,
        mode: CompetitionMode,
        order: DrawOrder,
    ) -> Result<CompetitionState, CompetitionError> {
        let lock = self.competition_lock(id)?;
        let _guard = lock.lock().map_err(|_| lock_error())?;

        let mut state = self.store.get_state(id)?;
        if state.phase != Phase::Registration {
            return Err(CompetitionError::invalid_phase(state.phase, "start"));
        }
        let participants = self.store.list_participants(id)?;
        if participants.len() < 2 {
            return Err(CompetitionError::NotEnoughParticipants {
                found: participants.len(),
            });
        }
        let draw = draw_order(&participants, order);

        let matches: Vec<Match> = match mode {
            CompetitionMode::Knockout { capacity } => {
                let bracket = build_bracket(id, &draw, capacity.unwrap_or(draw.len()))?;
                state.bracket_size = Some(bracket.size);
                bracket.matches().cloned().collect()
            }
            CompetitionMode::GroupsThenKnockout {
                sizing,
                advancement_count,
            } => {
                let groups = allocate_groups(&draw, sizing, advancement_count)?;
                let matches = groups.iter().flat_map(|g| group_matches(id, g)).collect();
                state.groups = groups;
                matches
            }
            CompetitionMode::RoundRobin => round_robin_matches(id, &draw),
        };

        // Replaces whatever an earlier start left behind if its state write failed.
        self.store.replace_matches(id, None, matches)?;
        state.mode = Some(mode);
        state.draw = draw;
        state.enter(mode.first_phase());
        self.store.set_state(state.clone())?;
        info!(
            "Competition {} started in {} with {} participants",
            id,
            state.phase,
            state.draw.len()
        );
        Ok(state)
    }

    /// Move to the next phase once the current one is finished.
    ///
    /// Groups → knockout takes the top `advancement_count` of each group. Knockout and
    /// round-robin complete when every match is decided.
    pub fn advance_phase(&self, id: CompetitionId) -> Result<CompetitionState, CompetitionError> {
        let lock = self.competition_lock(id)?;
        let _guard = lock.lock().map_err(|_| lock_error())?;

        let mut state = self.store.get_state(id)?;
        match state.phase {
            Phase::Groups => self.start_knockout_from_groups(&mut state)?,
            Phase::Knockout => {
                let matches = self.store.list_matches(id, Some(Stage::Knockout))?;
                let bracket = Bracket::from_matches(state.bracket_size.unwrap_or(0), matches);
                if !bracket.final_match().map_or(false, Match::is_completed) {
                    let pending = bracket.matches().filter(|m| !m.is_completed()).count();
                    return Err(CompetitionError::MatchesPending { pending });
                }
                state.enter(Phase::Completed);
            }
            Phase::RoundRobin => {
                let pending = pending_count(&self.store.list_matches(id, Some(Stage::RoundRobin))?);
                if pending > 0 {
                    return Err(CompetitionError::MatchesPending { pending });
                }
                state.enter(Phase::Completed);
            }
            Phase::Registration | Phase::Completed => {
                return Err(CompetitionError::invalid_phase(state.phase, "advance"));
            }
        }
        self.store.set_state(state.clone())?;
        info!("Competition {} advanced to {}", id, state.phase);
        Ok(state)
    }

    fn start_knockout_from_groups(&self, state: &mut CompetitionState) -> Result<(), CompetitionError> {
        let id = state.id;
        let all = self.store.list_matches(id, None)?;
        let group_stage: Vec<Match> = all
            .into_iter()
            .filter(|m| matches!(m.stage, Stage::Group(_)))
            .collect();
        let pending = pending_count(&group_stage);
        if pending > 0 {
            return Err(CompetitionError::GroupsNotFinished { pending });
        }

        let participants = self.store.list_participants(id)?;
        let qualifiers: Vec<Vec<ParticipantId>> = state
            .groups
            .iter()
            .map(|g| {
                let members = seeded_order(&g.members, &participants);
                let matches: Vec<Match> = group_stage
                    .iter()
                    .filter(|m| m.stage == Stage::Group(g.index))
                    .cloned()
                    .collect();
                top(&compute_standings(&members, &matches), g.advancement_count)
            })
            .collect();
        let entrants = knockout_draw(&qualifiers);

        let bracket = build_bracket(id, &entrants, entrants.len())?;
        let decided = bracket.final_match().map_or(false, Match::is_completed);
        self.store
            .replace_matches(id, Some(Stage::Knockout), bracket.matches().cloned().collect())?;
        state.bracket_size = Some(bracket.size);
        // A lone qualifier wins the final on byes.
        state.enter(if decided { Phase::Completed } else { Phase::Knockout });
        Ok(())
    }

    /// Admin override: end the competition from any active phase.
    pub fn force_complete(&self, id: CompetitionId) -> Result<CompetitionState, CompetitionError> {
        let lock = self.competition_lock(id)?;
        let _guard = lock.lock().map_err(|_| lock_error())?;

        let mut state = self.store.get_state(id)?;
        if !state.phase.is_active() {
            return Err(CompetitionError::invalid_phase(state.phase, "complete"));
        }
        warn!("Competition {} force-completed from {}", id, state.phase);
        state.enter(Phase::Completed);
        self.store.set_state(state.clone())?;
        Ok(state)
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Submit the result of a match.
    ///
    /// The sets are validated first. An identical resubmission returns the stored match
    /// unchanged; a different result for a decided match fails with `AlreadyCompleted`.
    /// Knockout winners move on to the next round; the final (or the last round-robin
    /// match) completes the competition.
    pub fn submit_result(&self, match_id: MatchId, sets: &[SetScore]) -> Result<Match, CompetitionError> {
        self.apply_result(match_id, sets, false)
    }

    /// Correct the result of a match. Knockout corrections that change the winner are
    /// refused once a later match on that path has been played.
    pub fn edit_result(&self, match_id: MatchId, sets: &[SetScore]) -> Result<Match, CompetitionError> {
        self.apply_result(match_id, sets, true)
    }

    fn apply_result(&self, match_id: MatchId, sets: &[SetScore], edit: bool) -> Result<Match, CompetitionError> {
        let competition_id = self.store.get_match(match_id)?.competition_id;
        let lock = self.competition_lock(competition_id)?;
        let _guard = lock.lock().map_err(|_| lock_error())?;

        // Re-read under the lock: another writer may have committed meanwhile.
        let mut m = self.store.get_match(match_id)?;
        let mut state = self.store.get_state(competition_id)?;
        ensure_active(&state, &m)?;
        if !m.is_playable() {
            return Err(ProgressionError::MatchNotReady(match_id).into());
        }
        let score = validate_score(sets, state.format)?;

        if m.is_completed() && m.same_result(score.winner, &score.sets) {
            debug!("Identical result resubmitted for match {}", match_id);
            return Ok(m);
        }
        if m.is_completed() && !edit {
            return Err(ProgressionError::AlreadyCompleted(match_id).into());
        }

        let (updated, finished) = if m.stage == Stage::Knockout {
            let size = state.bracket_size.unwrap_or(0);
            let mut bracket =
                Bracket::from_matches(size, self.store.list_matches(competition_id, Some(Stage::Knockout))?);
            let changed = if edit {
                edit_result(&mut bracket, match_id, score.winner, score.sets)?
            } else {
                record_result(&mut bracket, match_id, score.winner, score.sets)?
            };
            let finished = bracket.final_match().map_or(false, Match::is_completed);
            let writes: Vec<Match> = bracket
                .matches()
                .filter(|b| changed.contains(&b.id))
                .cloned()
                .collect();
            let written = self.commit(writes)?;
            let updated = written
                .into_iter()
                .find(|w| w.id == match_id)
                .ok_or(ProgressionError::MatchNotFound(match_id))?;
            (updated, finished)
        } else {
            m.complete(score.winner, score.sets);
            let updated = self
                .commit(vec![m])?
                .into_iter()
                .next()
                .ok_or(ProgressionError::MatchNotFound(match_id))?;
            let finished = updated.stage == Stage::RoundRobin
                && pending_count(&self.store.list_matches(competition_id, Some(Stage::RoundRobin))?) == 0;
            (updated, finished)
        };
        debug!(
            "Result recorded for match {} ({} sets)",
            match_id,
            updated.sets.len()
        );

        if finished && state.phase != Phase::Completed {
            state.enter(Phase::Completed);
            self.store.set_state(state)?;
            info!("Competition {} completed", competition_id);
        }
        Ok(updated)
    }

    fn commit(&self, writes: Vec<Match>) -> Result<Vec<Match>, CompetitionError> {
        self.store.upsert_matches(writes).map_err(|e| {
            warn!("Match write rejected: {}", e);
            e.into()
        })
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Current bracket; empty until a knockout exists.
    pub fn get_bracket(&self, id: CompetitionId) -> Result<Bracket, CompetitionError> {
        let state = self.store.get_state(id)?;
        match state.bracket_size {
            None => Ok(Bracket::empty()),
            Some(size) => Ok(Bracket::from_matches(
                size,
                self.store.list_matches(id, Some(Stage::Knockout))?,
            )),
        }
    }

    /// Standings recomputed from the stored matches. Without a scope the whole field is
    /// ranked over every group and round-robin match. Ties that survive every key keep
    /// seed then registration order.
    pub fn get_standings(
        &self,
        id: CompetitionId,
        scope: Option<StandingsScope>,
    ) -> Result<Vec<Standing>, CompetitionError> {
        let state = self.store.get_state(id)?;
        let participants = self.store.list_participants(id)?;
        match scope.unwrap_or_default() {
            StandingsScope::Overall => {
                let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
                let field = seeded_order(&ids, &participants);
                let matches: Vec<Match> = self
                    .store
                    .list_matches(id, None)?
                    .into_iter()
                    .filter(|m| m.stage != Stage::Knockout)
                    .collect();
                Ok(compute_standings(&field, &matches))
            }
            StandingsScope::Group(index) => {
                let group = state
                    .group(index)
                    .ok_or(CompetitionError::GroupNotFound(index))?;
                let members = seeded_order(&group.members, &participants);
                let matches = self.store.list_matches(id, Some(Stage::Group(index)))?;
                Ok(compute_standings(&members, &matches))
            }
        }
    }
}

/// Results are only taken for matches of the phase currently being played.
fn ensure_active(state: &CompetitionState, m: &Match) -> Result<(), CompetitionError> {
    if !state.phase.is_active() {
        return Err(CompetitionError::invalid_phase(state.phase, "record results"));
    }
    let belongs = matches!(
        (state.phase, m.stage),
        (Phase::Groups, Stage::Group(_))
            | (Phase::Knockout, Stage::Knockout)
            | (Phase::RoundRobin, Stage::RoundRobin)
    );
    if !belongs {
        return Err(CompetitionError::MatchNotActive(m.id));
    }
    Ok(())
}

fn pending_count(matches: &[Match]) -> usize {
    matches.iter().filter(|m| !m.is_completed()).count()
}

/// Participants among `members`, seeds first then by registration, whatever the draw.
/// This is the standings fallback order.
fn seeded_order(members: &[ParticipantId], participants: &[Participant]) -> Vec<Participant> {
    let field: Vec<ParticipantId> = draw_order(participants, DrawOrder::Seeded)
        .into_iter()
        .filter(|id| members.contains(id))
        .collect();
    in_order(&field, participants)
}

/// Participants for `ids`, in the order of `ids`.
fn in_order(ids: &[ParticipantId], participants: &[Participant]) -> Vec<Participant> {
    let by_id: HashMap<ParticipantId, &Participant> = participants.iter().map(|p| (p.id, p)).collect();
    ids.iter()
        .filter_map(|id| by_id.get(id).map(|p| (*p).clone()))
        .collect()
}
