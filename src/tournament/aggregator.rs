//! Tournament Aggregator
//!
//! Keeps a roster of participants, moves the synthetic ones forward on a
//! fixed cadence and recomputes ranks once per tick while the tournament is
//! active. Like a session, it owns its clock and timers and tags every timer
//! with a generation, so a lobby reset cannot be undone by a late callback.

use std::fmt;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::{CancelGuard, DeterministicRng, StateHash, Tick, Timer, TimerQueue};
use crate::error::EngineError;
use super::events::{TournamentEvent, TournamentEventData};
use super::roster::{rank_participants, roster_hash, Participant, ParticipantId};

/// Seed-derivation domain for tournament RNG streams.
pub const TOURNAMENT_SEED_DOMAIN: &[u8] = b"tournament";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Unique tournament identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TournamentId(pub Uuid);

impl TournamentId {
    /// Fresh random id.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Statistical shape of synthetic opponents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Ticks between synthetic updates.
    pub cadence_ticks: u32,
    /// Chance (percent) that an opponent scores on an update.
    pub score_chance_pct: u32,
    /// Smallest point gain.
    pub min_points: u32,
    /// Largest point gain.
    pub max_points: u32,
    /// Chance (percent) that a scoring opponent extends its streak.
    pub streak_keep_pct: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            cadence_ticks: 2,
            score_chance_pct: 30,
            min_points: 20,
            max_points: 69,
            streak_keep_pct: 70,
        }
    }
}

/// Tournament configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Display name.
    pub name: String,
    /// Base seed for the synthetic opponent stream.
    pub seed: u64,
    /// Ticks between `begin` and play.
    pub countdown_ticks: u32,
    /// Length of play.
    pub duration_ticks: u32,
    /// Roster capacity.
    pub max_participants: usize,
    /// Prize per final rank, first place first.
    pub prize_table: Vec<String>,
    /// Synthetic opponent model.
    pub synthetic: SyntheticConfig,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            name: "Math Battle Arena".to_string(),
            seed: 0,
            countdown_ticks: 5,
            duration_ticks: 120,
            max_participants: 12,
            prize_table: vec![
                "Winner Badge".to_string(),
                "Gold Medal".to_string(),
                "Premium Access".to_string(),
            ],
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Tournament status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Lobby open
    #[default]
    Waiting,
    /// Counting down to play
    Countdown,
    /// Play in progress
    Active,
    /// Results frozen
    Finished,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TournamentStatus::Waiting => "waiting",
            TournamentStatus::Countdown => "countdown",
            TournamentStatus::Active => "active",
            TournamentStatus::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Prize resolved for a final rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeAward {
    /// Winner
    pub participant: ParticipantId,
    /// Winner's name
    pub display_name: String,
    /// Final rank
    pub rank: u32,
    /// Prize
    pub prize: String,
}

/// Delayed actions a tournament schedules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentTimer {
    /// Countdown over
    CountdownElapsed,
    /// Play time over
    DurationElapsed,
    /// Move synthetic opponents
    SyntheticStep,
}

// =============================================================================
// TOURNAMENT
// =============================================================================

/// A tournament with a live leaderboard.
#[derive(Clone, Debug)]
pub struct Tournament {
    id: TournamentId,
    config: TournamentConfig,
    status: TournamentStatus,
    roster: Vec<Participant>,
    rng: DeterministicRng,
    guard: CancelGuard,
    timers: TimerQueue<TournamentTimer>,
    now: Tick,
    awards: Vec<PrizeAward>,
    /// Standings carried by the last `LeaderboardUpdated`.
    published: Vec<Participant>,
    pending_events: Vec<TournamentEvent>,
}

impl Tournament {
    /// Create a tournament with a random id.
    pub fn new(config: TournamentConfig) -> Self {
        Self::with_id(TournamentId::new_v4(), config)
    }

    /// Create a tournament with a known id.
    pub fn with_id(id: TournamentId, config: TournamentConfig) -> Self {
        let rng = DeterministicRng::for_round(config.seed, TOURNAMENT_SEED_DOMAIN, 0);
        Self {
            id,
            config,
            status: TournamentStatus::Waiting,
            roster: Vec::new(),
            rng,
            guard: CancelGuard::new(),
            timers: TimerQueue::new(),
            now: 0,
            awards: Vec::new(),
            published: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> TournamentId {
        self.id
    }

    /// Configuration.
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Status.
    pub fn status(&self) -> TournamentStatus {
        self.status
    }

    /// Tournament clock.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Ranked roster.
    pub fn leaderboard(&self) -> &[Participant] {
        &self.roster
    }

    /// Look up a participant.
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == id)
    }

    /// Prizes resolved by `finalize`.
    pub fn awards(&self) -> &[PrizeAward] {
        &self.awards
    }

    /// Prize won by a participant, if any.
    pub fn prize_for(&self, id: ParticipantId) -> Option<&str> {
        self.awards
            .iter()
            .find(|award| award.participant == id)
            .map(|award| award.prize.as_str())
    }

    /// Ticks left until play starts.
    pub fn countdown_left(&self) -> Option<u32> {
        self.ticks_until(TournamentTimer::CountdownElapsed)
    }

    /// Ticks of play left.
    pub fn time_left(&self) -> Option<u32> {
        self.ticks_until(TournamentTimer::DurationElapsed)
    }

    /// Pending timers in firing order.
    pub fn pending_timers(&self) -> impl Iterator<Item = &Timer<TournamentTimer>> {
        self.timers.iter()
    }

    /// Digest of the ranked roster.
    pub fn compute_hash(&self) -> StateHash {
        roster_hash(&self.roster)
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<TournamentEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Add a participant while the lobby is open.
    pub fn join(&mut self, participant: Participant) -> Result<(), EngineError> {
        if self.status != TournamentStatus::Waiting {
            return Err(EngineError::invalid("join", self.status));
        }
        if self.roster.len() >= self.config.max_participants {
            return Err(EngineError::TournamentFull {
                capacity: self.config.max_participants,
            });
        }
        if self.participant(participant.id).is_some() {
            return Err(EngineError::DuplicateParticipant(participant.id));
        }

        let id = participant.id;
        self.roster.push(participant);
        self.push_event(TournamentEventData::ParticipantJoined {
            participant: id,
            roster_size: self.roster.len(),
        });
        self.recompute_ranks();
        Ok(())
    }

    /// Close the lobby and start the countdown.
    pub fn begin(&mut self) -> Result<(), EngineError> {
        if self.status != TournamentStatus::Waiting {
            return Err(EngineError::invalid("begin", self.status));
        }

        let generation = self.guard.arm();
        self.rng = DeterministicRng::for_round(self.config.seed, TOURNAMENT_SEED_DOMAIN, generation);
        self.awards.clear();
        info!(tournament = %self.id, participants = self.roster.len(), "tournament starting");

        self.set_status(TournamentStatus::Countdown);
        if self.config.countdown_ticks == 0 {
            self.activate();
        } else {
            self.schedule(TournamentTimer::CountdownElapsed, self.config.countdown_ticks);
        }
        Ok(())
    }

    /// Advance one tick: fire due timers, then rerank while active.
    ///
    /// Returns true if the tournament finished during this tick.
    pub fn tick(&mut self) -> bool {
        let was_finished = self.status == TournamentStatus::Finished;
        self.now += 1;

        while let Some(timer) = self.timers.pop_due(self.now) {
            self.fire_timer(timer);
        }

        if self.status == TournamentStatus::Active {
            self.recompute_ranks();
        }
        !was_finished && self.status == TournamentStatus::Finished
    }

    /// Apply one timer callback. Stale timers are discarded.
    pub fn fire_timer(&mut self, timer: Timer<TournamentTimer>) -> bool {
        if !self.guard.admits(timer.generation) {
            debug!(
                timer = timer.id.0,
                generation = timer.generation,
                current = self.guard.generation(),
                "discarding stale tournament timer"
            );
            return false;
        }

        match (&timer.kind, self.status) {
            (TournamentTimer::CountdownElapsed, TournamentStatus::Countdown) => self.activate(),
            (TournamentTimer::SyntheticStep, TournamentStatus::Active) => {
                self.advance_synthetic(self.now);
                self.schedule(TournamentTimer::SyntheticStep, self.config.synthetic.cadence_ticks);
            }
            (TournamentTimer::DurationElapsed, TournamentStatus::Active) => {
                if let Err(err) = self.finalize() {
                    debug!(%err, "finalize on time out failed");
                }
            }
            (kind, status) => {
                debug!(?kind, %status, "timer no longer applies");
                return false;
            }
        }
        true
    }

    /// Move every synthetic participant once.
    ///
    /// With the configured probability an opponent gains a bounded number of
    /// points and a correct answer, and either extends or loses its streak.
    /// Returns the number of opponents that scored. No-op unless active.
    pub fn advance_synthetic(&mut self, tick: Tick) -> usize {
        if self.status != TournamentStatus::Active {
            return 0;
        }

        let synthetic = self.config.synthetic.clone();
        let low = synthetic.min_points.min(synthetic.max_points).min(i32::MAX as u32) as i32;
        let high = synthetic.max_points.max(synthetic.min_points).min(i32::MAX as u32) as i32;

        let mut order: Vec<usize> = (0..self.roster.len())
            .filter(|&i| !self.roster[i].is_real)
            .collect();
        order.sort_by_key(|&i| self.roster[i].id);

        let mut scored = 0;
        for index in order {
            if !self.rng.chance(synthetic.score_chance_pct) {
                continue;
            }
            let delta = self.rng.next_int_range(low, high).max(0) as u64;
            let keep_streak = self.rng.chance(synthetic.streak_keep_pct);

            let participant = &mut self.roster[index];
            participant.score += delta;
            participant.correct += 1;
            participant.streak = if keep_streak { participant.streak + 1 } else { 0 };
            scored += 1;
        }

        debug!(tick, scored, "synthetic participants advanced");
        scored
    }

    /// Record the real participant's running score.
    pub fn record_score(
        &mut self,
        id: ParticipantId,
        score: u64,
        streak: u32,
    ) -> Result<(), EngineError> {
        if self.status == TournamentStatus::Finished {
            return Err(EngineError::invalid("record score", self.status));
        }
        let participant = self
            .roster
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::ParticipantNotFound(id))?;

        participant.score = score;
        participant.streak = streak;
        Ok(())
    }

    /// Re-sort the roster and reassign ranks.
    ///
    /// Idempotent. Does nothing on an empty roster or once finished.
    /// Publishes the standings and returns true whenever any score,
    /// streak or rank differs from the last published standings.
    pub fn recompute_ranks(&mut self) -> bool {
        if self.roster.is_empty() || self.status == TournamentStatus::Finished {
            return false;
        }
        let reordered = rank_participants(&mut self.roster);
        if !reordered && self.roster == self.published {
            return false;
        }

        self.published = self.roster.clone();
        self.pending_events
            .push(TournamentEvent::leaderboard_updated(self.now, self.published.clone()));
        true
    }

    /// Freeze the roster and resolve prizes. Only legal while active.
    pub fn finalize(&mut self) -> Result<Vec<PrizeAward>, EngineError> {
        if self.status != TournamentStatus::Active {
            return Err(EngineError::invalid("finalize", self.status));
        }

        self.recompute_ranks();
        self.awards = self
            .roster
            .iter()
            .zip(self.config.prize_table.iter())
            .map(|(participant, prize)| PrizeAward {
                participant: participant.id,
                display_name: participant.display_name.clone(),
                rank: participant.rank,
                prize: prize.clone(),
            })
            .collect();

        self.set_status(TournamentStatus::Finished);
        self.push_event(TournamentEventData::TournamentFinished {
            standings: self.roster.clone(),
            awards: self.awards.clone(),
        });

        self.guard.invalidate();
        let cancelled = self.timers.cancel_all();
        info!(tournament = %self.id, cancelled, "tournament finished");
        Ok(self.awards.clone())
    }

    /// Back to the lobby: scores zeroed, timers dropped, roster kept.
    pub fn reset(&mut self) {
        self.guard.invalidate();
        let cancelled = self.timers.cancel_all();

        for participant in &mut self.roster {
            participant.clear_progress();
        }
        self.awards.clear();
        self.set_status(TournamentStatus::Waiting);
        self.recompute_ranks();
        debug!(tournament = %self.id, cancelled, "tournament reset");
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn activate(&mut self) {
        self.set_status(TournamentStatus::Active);
        self.schedule(TournamentTimer::DurationElapsed, self.config.duration_ticks);

        let has_synthetic = self.roster.iter().any(|p| !p.is_real);
        if has_synthetic && self.config.synthetic.cadence_ticks > 0 {
            self.schedule(TournamentTimer::SyntheticStep, self.config.synthetic.cadence_ticks);
        }
        self.recompute_ranks();
    }

    fn schedule(&mut self, kind: TournamentTimer, delay: u32) {
        let due = self.now + u64::from(delay);
        self.timers.schedule(kind, due, self.guard.generation());
    }

    fn set_status(&mut self, to: TournamentStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        self.pending_events
            .push(TournamentEvent::status_changed(self.now, from, to));
    }

    fn push_event(&mut self, data: TournamentEventData) {
        self.pending_events.push(TournamentEvent::new(self.now, data));
    }

    fn ticks_until(&self, kind: TournamentTimer) -> Option<u32> {
        self.timers
            .due_of(|k| *k == kind)
            .map(|due| due.saturating_sub(self.now).min(u64::from(u32::MAX)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::roster::default_opponents;
    use proptest::prelude::*;

    fn lobby(seed: u64) -> Tournament {
        let config = TournamentConfig { seed, ..TournamentConfig::default() };
        let mut tournament = Tournament::new(config);
        tournament.join(Participant::real(1, "You")).unwrap();
        for opponent in default_opponents() {
            tournament.join(opponent).unwrap();
        }
        tournament
    }

    fn run_to_active(tournament: &mut Tournament) {
        tournament.begin().unwrap();
        for _ in 0..tournament.config().countdown_ticks {
            tournament.tick();
        }
        assert_eq!(tournament.status(), TournamentStatus::Active);
    }

    #[test]
    fn test_join_rules() {
        let mut tournament = Tournament::new(TournamentConfig::default());
        for id in 1..=12 {
            tournament.join(Participant::synthetic(id, format!("bot{id}"))).unwrap();
        }
        assert_eq!(
            tournament.join(Participant::synthetic(13, "late")),
            Err(EngineError::TournamentFull { capacity: 12 })
        );

        let mut tournament = lobby(1);
        assert_eq!(
            tournament.join(Participant::synthetic(2, "again")),
            Err(EngineError::DuplicateParticipant(ParticipantId(2)))
        );

        tournament.begin().unwrap();
        assert!(matches!(
            tournament.join(Participant::synthetic(40, "late")),
            Err(EngineError::InvalidTransition { operation: "join", .. })
        ));
    }

    #[test]
    fn test_lifecycle_and_prizes() {
        let mut tournament = lobby(7);
        tournament.begin().unwrap();
        assert_eq!(tournament.countdown_left(), Some(5));

        run_to_active_from_countdown(&mut tournament);
        assert_eq!(tournament.time_left(), Some(120));

        let mut finished_at = None;
        for tick in 1..=120 {
            if tournament.tick() {
                finished_at = Some(tick);
            }
        }
        assert_eq!(finished_at, Some(120));
        assert_eq!(tournament.status(), TournamentStatus::Finished);

        let awards = tournament.awards();
        assert_eq!(awards.len(), 3);
        assert_eq!(awards[0].rank, 1);
        assert_eq!(awards[0].prize, "Winner Badge");
        assert_eq!(tournament.prize_for(awards[2].participant), Some("Premium Access"));

        // Synthetic opponents scored something over two minutes
        assert!(tournament.leaderboard().iter().any(|p| !p.is_real && p.score > 0));
        let events = tournament.take_events();
        assert!(events.iter().any(|e| e.is_finished()));
    }

    fn run_to_active_from_countdown(tournament: &mut Tournament) {
        for _ in 0..5 {
            tournament.tick();
        }
        assert_eq!(tournament.status(), TournamentStatus::Active);
    }

    #[test]
    fn test_real_participant_rank_against_synthetic() {
        // Synthetic ids 1..=5, real participant last so it loses ties
        let build = |synthetic_scores: [u64; 5]| {
            let mut tournament = Tournament::new(TournamentConfig {
                synthetic: SyntheticConfig { cadence_ticks: 0, ..SyntheticConfig::default() },
                ..TournamentConfig::default()
            });
            for id in 1..=5 {
                tournament.join(Participant::synthetic(id, format!("bot{id}"))).unwrap();
            }
            tournament.join(Participant::real(6, "You")).unwrap();
            run_to_active(&mut tournament);

            tournament.record_score(ParticipantId(6), 100, 4).unwrap();
            for (i, score) in synthetic_scores.iter().enumerate() {
                tournament.record_score(ParticipantId(i as u32 + 1), *score, 0).unwrap();
            }
            tournament.recompute_ranks();
            tournament.participant(ParticipantId(6)).unwrap().rank
        };

        assert_eq!(build([0, 20, 99, 45, 60]), 1);
        assert_eq!(build([0, 20, 100, 45, 60]), 2);
        assert_eq!(build([140, 20, 100, 45, 60]), 3);
    }

    #[test]
    fn test_recompute_is_idempotent_and_frozen_when_finished() {
        let mut tournament = lobby(3);
        run_to_active(&mut tournament);
        tournament.record_score(ParticipantId(1), 55, 2).unwrap();

        tournament.recompute_ranks();
        let hash = tournament.compute_hash();
        assert!(!tournament.recompute_ranks());
        assert_eq!(tournament.compute_hash(), hash);

        tournament.finalize().unwrap();
        assert!(tournament.finalize().is_err());
        assert!(tournament.record_score(ParticipantId(1), 999, 0).is_err());
        assert!(!tournament.recompute_ranks());
        assert_eq!(tournament.advance_synthetic(999), 0);
    }

    #[test]
    fn test_score_change_without_reorder_is_published() {
        let mut tournament = Tournament::new(TournamentConfig {
            synthetic: SyntheticConfig { cadence_ticks: 0, ..SyntheticConfig::default() },
            ..TournamentConfig::default()
        });
        tournament.join(Participant::real(1, "You")).unwrap();
        tournament.join(Participant::synthetic(2, "bot")).unwrap();
        run_to_active(&mut tournament);

        tournament.record_score(ParticipantId(1), 100, 1).unwrap();
        assert!(tournament.recompute_ranks());
        tournament.take_events();

        // Same order, new score.
        tournament.record_score(ParticipantId(1), 250, 2).unwrap();
        assert!(tournament.recompute_ranks());
        let published = tournament.take_events().into_iter().find_map(|e| match e.data {
            TournamentEventData::LeaderboardUpdated { standings } => Some(standings),
            _ => None,
        });
        let standings = published.expect("leaderboard update");
        assert_eq!(standings[0].id, ParticipantId(1));
        assert_eq!(standings[0].score, 250);
        assert_eq!(standings[0].streak, 2);

        assert!(!tournament.recompute_ranks());
        assert!(tournament.take_events().is_empty());
    }

    #[test]
    fn test_finalize_requires_active() {
        let mut tournament = lobby(3);
        assert!(matches!(
            tournament.finalize(),
            Err(EngineError::InvalidTransition { operation: "finalize", .. })
        ));
        tournament.begin().unwrap();
        assert!(tournament.finalize().is_err());
    }

    #[test]
    fn test_record_unknown_participant() {
        let mut tournament = lobby(3);
        assert_eq!(
            tournament.record_score(ParticipantId(77), 10, 1),
            Err(EngineError::ParticipantNotFound(ParticipantId(77)))
        );
    }

    #[test]
    fn test_synthetic_steps_are_bounded_and_seeded() {
        let run = |seed| {
            let mut tournament = lobby(seed);
            run_to_active(&mut tournament);
            let mut previous: Vec<(ParticipantId, u64, u32)> = Vec::new();
            for _ in 0..40 {
                let snapshot: Vec<_> = tournament
                    .leaderboard()
                    .iter()
                    .map(|p| (p.id, p.score, p.correct))
                    .collect();
                tournament.advance_synthetic(tournament.now());
                for (id, score, correct) in &snapshot {
                    let now = tournament.participant(*id).unwrap();
                    let gained = now.score - score;
                    assert!(gained == 0 || (20..=69).contains(&gained));
                    assert_eq!(now.correct - correct, u32::from(gained > 0));
                }
                previous = snapshot;
            }
            assert!(!previous.is_empty());
            tournament.compute_hash()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_reset_returns_to_lobby() {
        let mut tournament = lobby(5);
        run_to_active(&mut tournament);
        let stale: Vec<_> = tournament.pending_timers().cloned().collect();
        for _ in 0..10 {
            tournament.tick();
        }

        tournament.reset();
        assert_eq!(tournament.status(), TournamentStatus::Waiting);
        assert!(tournament.leaderboard().iter().all(|p| p.score == 0 && p.streak == 0));
        assert!(tournament.awards().is_empty());
        assert_eq!(tournament.pending_timers().count(), 0);

        let hash = tournament.compute_hash();
        for timer in stale {
            assert!(!tournament.fire_timer(timer));
        }
        assert_eq!(tournament.compute_hash(), hash);
        assert_eq!(tournament.status(), TournamentStatus::Waiting);

        // Lobby is open again
        tournament.join(Participant::synthetic(30, "newcomer")).unwrap();
    }

    proptest! {
        #[test]
        fn prop_real_first_iff_no_synthetic_reaches_score(
            scores in proptest::collection::vec(0u64..200, 5)
        ) {
            let mut tournament = Tournament::new(TournamentConfig {
                synthetic: SyntheticConfig { cadence_ticks: 0, ..SyntheticConfig::default() },
                countdown_ticks: 0,
                ..TournamentConfig::default()
            });
            for id in 1..=5 {
                tournament.join(Participant::synthetic(id, format!("bot{id}"))).unwrap();
            }
            tournament.join(Participant::real(6, "You")).unwrap();
            tournament.begin().unwrap();

            tournament.record_score(ParticipantId(6), 100, 1).unwrap();
            for (i, score) in scores.iter().enumerate() {
                tournament.record_score(ParticipantId(i as u32 + 1), *score, 0).unwrap();
            }
            tournament.recompute_ranks();

            let rank = tournament.participant(ParticipantId(6)).unwrap().rank;
            let beaten = scores.iter().any(|s| *s >= 100);
            prop_assert_eq!(rank == 1, !beaten);
        }
    }
}
