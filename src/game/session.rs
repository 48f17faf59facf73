//! Session State Machine
//!
//! One timed challenge round for one participant:
//!
//! ```text
//! Idle --start--> Countdown --elapsed--> Showing --revealed--> AwaitingInput
//!                                   \________________________/      |
//!                                                                   v
//!            Finished <--lives out / time up-- Feedback <--verdict / deadline
//!                                                 |
//!                                                 +--> next challenge
//! ```
//!
//! The session owns its clock (`now`), its RNG and a [`TimerQueue`]. The only
//! mutators are [`Session::start`], [`Session::submit_input`],
//! [`Session::tick`], [`Session::finish`] and [`Session::reset`]. Every timer
//! is tagged with the generation it was scheduled under and is ignored once
//! the session has been reset or has finished.

use std::collections::VecDeque;
use std::fmt;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::{
    compute_session_hash, CancelGuard, DeterministicRng, Generation, StateHash, Tick, Timer,
    TimerQueue,
};
use crate::error::EngineError;
use super::challenge::{
    Challenge, ChallengeGenerator, ChallengePayload, ChallengeProgress, PlayerInput, Verdict,
};
use super::config::{GameKind, SessionConfig};
use super::events::{SessionEvent, SessionEventData};
use super::scoring::{self, ScoreInput};

/// Seed-derivation domain for session RNG streams.
pub const SESSION_SEED_DOMAIN: &[u8] = b"session";

// =============================================================================
// PHASES AND TIMERS
// =============================================================================

/// Session phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Not started
    #[default]
    Idle,
    /// Counting down to the first challenge
    Countdown,
    /// Presenting a recall sequence
    Showing,
    /// Waiting for the participant
    AwaitingInput,
    /// Displaying the last verdict
    Feedback,
    /// Round over
    Finished,
}

impl SessionPhase {
    /// Started and not yet finished.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            SessionPhase::Countdown
                | SessionPhase::Showing
                | SessionPhase::AwaitingInput
                | SessionPhase::Feedback
        )
    }

    fn code(self) -> u8 {
        match self {
            SessionPhase::Idle => 0,
            SessionPhase::Countdown => 1,
            SessionPhase::Showing => 2,
            SessionPhase::AwaitingInput => 3,
            SessionPhase::Feedback => 4,
            SessionPhase::Finished => 5,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Countdown => "countdown",
            SessionPhase::Showing => "showing",
            SessionPhase::AwaitingInput => "awaiting input",
            SessionPhase::Feedback => "feedback",
            SessionPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Delayed actions a session schedules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionTimer {
    /// Countdown over, first challenge due
    CountdownElapsed,
    /// Reveal the next recall element
    RevealNext,
    /// Step deadline of one challenge
    StepDeadline {
        /// Challenge the deadline belongs to
        challenge_id: u32,
    },
    /// Feedback display over
    FeedbackElapsed,
    /// Whole-session limit reached
    TimeUp,
}

// =============================================================================
// STATS AND SNAPSHOTS
// =============================================================================

/// Running counters for one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Completed steps (correct, wrong or timed out)
    pub attempts: u32,
    /// Correct steps
    pub correct: u32,
    /// Steps lost to the deadline
    pub timeouts: u32,
    /// Steps given up
    pub skipped: u32,
    /// Raw inputs received
    pub inputs: u32,
}

impl SessionStats {
    /// Correct share of attempts, 100 before the first attempt.
    pub fn accuracy_pct(&self) -> u32 {
        if self.attempts == 0 {
            return 100;
        }
        self.correct * 100 / self.attempts
    }

    /// Correct answers per minute of play.
    pub fn per_minute(&self, elapsed_ticks: u64, ticks_per_second: u32) -> u32 {
        if elapsed_ticks == 0 {
            return 0;
        }
        let per_minute = u64::from(self.correct) * 60 * u64::from(ticks_per_second.max(1)) / elapsed_ticks;
        per_minute.min(u64::from(u32::MAX)) as u32
    }
}

/// Read-only view of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Game
    pub kind: GameKind,
    /// Phase
    pub phase: SessionPhase,
    /// Session clock
    pub now: Tick,
    /// Score
    pub score: u64,
    /// Current streak
    pub streak: u32,
    /// Best streak this round
    pub best_streak: u32,
    /// Multiplier for the next answer
    pub multiplier: u32,
    /// Lives left, `None` when unlimited
    pub lives: Option<u32>,
    /// Level
    pub level: u32,
    /// Active challenge
    pub challenge: Option<Challenge>,
    /// Recall elements presented so far
    pub revealed: usize,
    /// Input entered against the active challenge
    pub progress: ChallengeProgress,
    /// Ticks until the first challenge
    pub countdown_left: Option<u32>,
    /// Ticks until the step deadline
    pub step_ticks_left: Option<u32>,
    /// Ticks until the session limit
    pub time_left: Option<u32>,
    /// Most recent final verdict
    pub last_verdict: Option<Verdict>,
    /// Counters
    pub stats: SessionStats,
    /// Accuracy percent
    pub accuracy_pct: u32,
    /// Correct answers per minute
    pub per_minute: u32,
    /// Inputs within the last second of ticks
    pub inputs_last_second: u32,
}

/// Result of one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// Timers applied this tick
    pub timers_fired: usize,
    /// Timers ignored this tick
    pub timers_discarded: usize,
    /// Whether the session finished this tick
    pub finished: bool,
}

// =============================================================================
// SESSION
// =============================================================================

/// One challenge round.
#[derive(Clone, Debug)]
pub struct Session {
    config: SessionConfig,
    generator: ChallengeGenerator,
    rng: DeterministicRng,
    guard: CancelGuard,
    timers: TimerQueue<SessionTimer>,

    now: Tick,
    phase: SessionPhase,
    score: u64,
    streak: u32,
    best_streak: u32,
    multiplier: u32,
    lives: Option<u32>,
    level: u32,
    flawless: bool,
    history_len: u32,

    active: Option<Challenge>,
    progress: ChallengeProgress,
    revealed: usize,
    last_verdict: Option<Verdict>,

    stats: SessionStats,
    play_started_at: Option<Tick>,
    recent_inputs: VecDeque<Tick>,

    pending_events: Vec<SessionEvent>,
}

impl Session {
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Self {
        let generator = ChallengeGenerator::new(config.kind, config.max_inputs_per_tick);
        let rng = DeterministicRng::for_round(config.seed, SESSION_SEED_DOMAIN, 0);
        let lives = config.lives;

        Self {
            config,
            generator,
            rng,
            guard: CancelGuard::new(),
            timers: TimerQueue::new(),
            now: 0,
            phase: SessionPhase::Idle,
            score: 0,
            streak: 0,
            best_streak: 0,
            multiplier: 1,
            lives,
            level: 1,
            flawless: true,
            history_len: 0,
            active: None,
            progress: ChallengeProgress::default(),
            revealed: 0,
            last_verdict: None,
            stats: SessionStats::default(),
            play_started_at: None,
            recent_inputs: VecDeque::new(),
            pending_events: Vec::new(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Session clock.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.guard.generation()
    }

    /// Score.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Current streak.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Lives left.
    pub fn lives(&self) -> Option<u32> {
        self.lives
    }

    /// Level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Active challenge.
    pub fn active_challenge(&self) -> Option<&Challenge> {
        self.active.as_ref()
    }

    /// Counters.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Whether the round is over.
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// Pending timers in firing order.
    pub fn pending_timers(&self) -> impl Iterator<Item = &Timer<SessionTimer>> {
        self.timers.iter()
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Begin a round. Only legal from `Idle`.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.phase != SessionPhase::Idle {
            return Err(EngineError::invalid("start", self.phase));
        }

        self.restore_initial();
        let generation = self.guard.arm();
        self.rng = DeterministicRng::for_round(self.config.seed, SESSION_SEED_DOMAIN, generation);

        debug!(generation, kind = %self.config.kind, "session started");
        self.set_phase(SessionPhase::Countdown);

        if self.config.countdown_ticks == 0 {
            self.enter_play();
        } else {
            self.schedule(SessionTimer::CountdownElapsed, self.config.countdown_ticks);
        }
        Ok(())
    }

    /// Judge one input against the active challenge.
    ///
    /// Returns `None` when no input is expected (any phase other than
    /// `AwaitingInput`); the session is left untouched.
    pub fn submit_input(&mut self, input: PlayerInput) -> Option<Verdict> {
        if self.phase != SessionPhase::AwaitingInput {
            debug!(phase = %self.phase, "input ignored");
            return None;
        }
        let challenge = self.active.as_ref()?;

        let verdict = challenge.judge(&mut self.progress, &input);
        self.stats.inputs += 1;
        self.recent_inputs.push_back(self.now);

        if verdict.is_final() {
            self.resolve(verdict);
        }
        Some(verdict)
    }

    /// Advance the clock one tick and apply every timer that falls due.
    pub fn tick(&mut self) -> TickResult {
        let mut result = TickResult::default();
        let was_finished = self.is_finished();

        self.now += 1;
        self.prune_inputs();

        while let Some(timer) = self.timers.pop_due(self.now) {
            if self.fire_timer(timer) {
                result.timers_fired += 1;
            } else {
                result.timers_discarded += 1;
            }
        }

        result.finished = !was_finished && self.is_finished();
        result
    }

    /// Apply one timer callback.
    ///
    /// Timers from an earlier generation, or arriving after the session
    /// stopped, are discarded and `false` is returned. So is a timer whose
    /// target no longer exists (a deadline for an answered challenge).
    pub fn fire_timer(&mut self, timer: Timer<SessionTimer>) -> bool {
        if !self.guard.admits(timer.generation) {
            debug!(
                timer = timer.id.0,
                generation = timer.generation,
                current = self.guard.generation(),
                "discarding stale session timer"
            );
            return false;
        }

        match (&timer.kind, self.phase) {
            (SessionTimer::CountdownElapsed, SessionPhase::Countdown) => self.enter_play(),
            (SessionTimer::RevealNext, SessionPhase::Showing) => self.reveal_next(),
            (SessionTimer::StepDeadline { challenge_id }, SessionPhase::AwaitingInput)
                if self.active.as_ref().map(|c| c.id) == Some(*challenge_id) =>
            {
                self.resolve(Verdict::Timeout)
            }
            (SessionTimer::FeedbackElapsed, SessionPhase::Feedback) => self.issue_challenge(),
            (SessionTimer::TimeUp, phase) if phase.is_running() => self.conclude(None),
            (kind, phase) => {
                debug!(?kind, %phase, "timer no longer applies");
                return false;
            }
        }
        true
    }

    /// End a running round early.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.finish_with_rank(None)
    }

    /// End a running round early, recording a tournament rank.
    pub fn finish_with_rank(&mut self, final_rank: Option<u32>) -> Result<(), EngineError> {
        if !self.phase.is_running() {
            return Err(EngineError::invalid("finish", self.phase));
        }
        self.conclude(final_rank);
        Ok(())
    }

    /// Return to `Idle` from any phase.
    ///
    /// Bumps the generation and drops every pending timer, so nothing
    /// scheduled before the reset can act afterwards.
    pub fn reset(&mut self) {
        let from = self.phase;
        let generation = self.guard.generation();

        self.guard.invalidate();
        let cancelled = self.timers.cancel_all();

        self.restore_initial();
        self.now = 0;
        self.phase = SessionPhase::Idle;

        debug!(generation, cancelled, %from, "session reset");
        if from != SessionPhase::Idle {
            self.pending_events.push(SessionEvent::phase_changed(
                self.now,
                self.guard.generation(),
                from,
                SessionPhase::Idle,
            ));
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn restore_initial(&mut self) {
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.multiplier = 1;
        self.lives = self.config.lives;
        self.level = 1;
        self.flawless = true;
        self.history_len = 0;
        self.active = None;
        self.progress.clear();
        self.revealed = 0;
        self.last_verdict = None;
        self.stats = SessionStats::default();
        self.play_started_at = None;
        self.recent_inputs.clear();
    }

    fn schedule(&mut self, kind: SessionTimer, delay: u32) {
        let due = self.now + u64::from(delay);
        self.timers.schedule(kind, due, self.guard.generation());
    }

    fn push_event(&mut self, data: SessionEventData) {
        self.pending_events
            .push(SessionEvent::new(self.now, self.guard.generation(), data));
    }

    fn set_phase(&mut self, to: SessionPhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.pending_events.push(SessionEvent::phase_changed(
            self.now,
            self.guard.generation(),
            from,
            to,
        ));
    }

    fn enter_play(&mut self) {
        self.play_started_at = Some(self.now);
        if let Some(duration) = self.config.session_duration_ticks {
            self.schedule(SessionTimer::TimeUp, duration);
        }
        self.issue_challenge();
    }

    fn issue_challenge(&mut self) {
        let deadline = self.config.deadline_for(self.level);
        let payload = self
            .generator
            .generate(&mut self.rng, self.level, self.history_len, deadline);

        let challenge_id = self.history_len;
        let reveal = matches!(payload, ChallengePayload::Recall { .. })
            && self.config.reveal_interval_ticks > 0;

        self.push_event(SessionEventData::ChallengeIssued {
            challenge_id,
            prompt: payload.to_string(),
            level: self.level,
        });

        self.active = Some(Challenge {
            id: challenge_id,
            payload,
            issued_at: self.now,
            expires_at: None,
        });
        self.progress.clear();
        self.revealed = 0;

        if reveal {
            self.set_phase(SessionPhase::Showing);
            self.reveal_next();
        } else {
            self.open_input();
        }
    }

    fn reveal_next(&mut self) {
        let next = match self.active.as_ref().map(|c| (c.id, &c.payload)) {
            Some((id, ChallengePayload::Recall { sequence })) => {
                sequence.get(self.revealed).map(|color| (id, *color))
            }
            _ => None,
        };

        match next {
            Some((challenge_id, color)) => {
                let index = self.revealed;
                self.revealed += 1;
                self.push_event(SessionEventData::ElementRevealed {
                    challenge_id,
                    index,
                    color,
                });
                self.schedule(SessionTimer::RevealNext, self.config.reveal_interval_ticks);
            }
            None => self.open_input(),
        }
    }

    fn open_input(&mut self) {
        let deadline = self.config.deadline_for(self.level);
        let expires_at = deadline.map(|ticks| self.now + u64::from(ticks));

        let Some(challenge) = self.active.as_mut() else {
            return;
        };
        challenge.expires_at = expires_at;
        let challenge_id = challenge.id;

        if let Some(ticks) = deadline {
            self.schedule(SessionTimer::StepDeadline { challenge_id }, ticks);
        }

        self.set_phase(SessionPhase::AwaitingInput);
        self.push_event(SessionEventData::InputOpened {
            challenge_id,
            expires_at,
        });
    }

    fn resolve(&mut self, verdict: Verdict) {
        let Some(challenge) = self.active.clone() else {
            return;
        };
        self.timers
            .cancel_where(|kind| matches!(kind, SessionTimer::StepDeadline { .. }));

        let remaining = challenge
            .expires_at
            .map_or(0, |expires| expires.saturating_sub(self.now))
            .min(u64::from(u32::MAX)) as u32;

        let outcome = scoring::score(
            &self.config.scoring,
            &ScoreInput {
                is_correct: verdict.is_correct(),
                is_on_time: verdict != Verdict::Timeout,
                streak_before: self.streak,
                level: self.level,
                remaining_step_ticks: remaining,
                weight: challenge.payload.weight(),
                flawless: self.flawless,
            },
        );

        self.stats.attempts += 1;
        match verdict {
            Verdict::Correct => self.stats.correct += 1,
            Verdict::Timeout => self.stats.timeouts += 1,
            Verdict::Skipped => self.stats.skipped += 1,
            _ => {}
        }
        self.history_len += 1;
        self.last_verdict = Some(verdict);
        self.push_event(SessionEventData::Verdict {
            challenge_id: challenge.id,
            verdict,
        });

        let changed = outcome.points > 0 || outcome.new_streak != self.streak;
        self.score += u64::from(outcome.points);
        self.streak = outcome.new_streak;
        self.best_streak = self.best_streak.max(self.streak);
        self.multiplier = outcome.multiplier;
        if changed {
            self.pending_events.push(SessionEvent::score_changed(
                self.now,
                self.guard.generation(),
                outcome.points,
                self.score,
                self.streak,
                self.multiplier,
            ));
        }

        if verdict.is_correct() {
            self.flawless = true;
            if self.config.advance_level_on_success {
                self.level += 1;
                self.push_event(SessionEventData::LevelUp { level: self.level });
            }
        } else {
            self.flawless = false;
            if outcome.life_lost && verdict.costs_life() {
                if let Some(lives) = self.lives.as_mut() {
                    *lives = lives.saturating_sub(1);
                    let lives_left = *lives;
                    self.push_event(SessionEventData::LifeLost { lives_left });
                    if lives_left == 0 {
                        self.conclude(None);
                        return;
                    }
                }
            }
        }

        if self.config.feedback_ticks == 0 || verdict == Verdict::Skipped {
            self.issue_challenge();
        } else {
            self.set_phase(SessionPhase::Feedback);
            self.schedule(SessionTimer::FeedbackElapsed, self.config.feedback_ticks);
        }
    }

    fn conclude(&mut self, final_rank: Option<u32>) {
        self.active = None;
        self.progress.clear();
        self.set_phase(SessionPhase::Finished);
        self.pending_events.push(SessionEvent::session_finished(
            self.now,
            self.guard.generation(),
            self.score,
            self.stats.correct,
            self.best_streak,
            final_rank,
        ));

        self.guard.invalidate();
        let cancelled = self.timers.cancel_all();
        debug!(score = self.score, cancelled, "session finished");
    }

    fn prune_inputs(&mut self) {
        let window = u64::from(self.config.ticks_per_second.max(1));
        while let Some(&at) = self.recent_inputs.front() {
            if at + window <= self.now {
                self.recent_inputs.pop_front();
            } else {
                break;
            }
        }
    }

    fn ticks_until(&self, due: Option<Tick>) -> Option<u32> {
        due.map(|due| due.saturating_sub(self.now).min(u64::from(u32::MAX)) as u32)
    }

    // =========================================================================
    // SNAPSHOT AND HASH
    // =========================================================================

    /// Read-only view for presentation layers.
    pub fn snapshot(&self) -> SessionSnapshot {
        let window = u64::from(self.config.ticks_per_second.max(1));
        let inputs_last_second = self
            .recent_inputs
            .iter()
            .filter(|&&at| at + window > self.now)
            .count() as u32;

        let step_ticks_left = if self.phase == SessionPhase::AwaitingInput {
            self.ticks_until(self.active.as_ref().and_then(|c| c.expires_at))
        } else {
            None
        };

        let elapsed = self
            .play_started_at
            .map_or(0, |started| self.now.saturating_sub(started));

        SessionSnapshot {
            kind: self.config.kind,
            phase: self.phase,
            now: self.now,
            score: self.score,
            streak: self.streak,
            best_streak: self.best_streak,
            multiplier: self.multiplier,
            lives: self.lives,
            level: self.level,
            challenge: self.active.clone(),
            revealed: self.revealed,
            progress: self.progress.clone(),
            countdown_left: self.ticks_until(
                self.timers
                    .due_of(|k| matches!(k, SessionTimer::CountdownElapsed)),
            ),
            step_ticks_left,
            time_left: self.ticks_until(self.timers.due_of(|k| matches!(k, SessionTimer::TimeUp))),
            last_verdict: self.last_verdict,
            stats: self.stats.clone(),
            accuracy_pct: self.stats.accuracy_pct(),
            per_minute: self.stats.per_minute(elapsed, self.config.ticks_per_second),
            inputs_last_second,
        }
    }

    /// Digest of the observable state plus the RNG position.
    pub fn compute_hash(&self) -> StateHash {
        compute_session_hash(self.now, self.guard.generation(), |h| {
            h.update_u8(self.phase.code());
            h.update_u64(self.score);
            h.update_u32(self.streak);
            h.update_u32(self.best_streak);
            h.update_u32(self.multiplier);
            h.update_opt_u32(self.lives);
            h.update_u32(self.level);
            h.update_bool(self.flawless);
            h.update_u32(self.history_len);

            match &self.active {
                Some(challenge) => {
                    h.update_u8(1);
                    h.update_u32(challenge.id);
                    h.update_str(&challenge.payload.to_string());
                    h.update_str(&challenge.payload.expected_answer());
                    h.update_u64(challenge.issued_at);
                    h.update_u64(challenge.expires_at.unwrap_or(0));
                }
                None => h.update_u8(0),
            }
            h.update_u32(self.revealed as u32);
            h.update_u32(self.progress.recalled.len() as u32);
            h.update_str(&self.progress.typed);

            h.update_u32(self.stats.attempts);
            h.update_u32(self.stats.correct);
            h.update_u32(self.stats.timeouts);
            h.update_u32(self.stats.skipped);
            h.update_u32(self.stats.inputs);

            let [s0, s1] = self.rng.state();
            h.update_u64(s0);
            h.update_u64(s1);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::challenge::Color;
    use crate::game::config::DeadlinePolicy;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn correct_input(session: &Session) -> PlayerInput {
        let challenge = session.active_challenge().expect("active challenge");
        match &challenge.payload {
            ChallengePayload::Click => PlayerInput::Click,
            ChallengePayload::Recall { sequence } => PlayerInput::Color(sequence[0]),
            ChallengePayload::Word { word } => PlayerInput::Text(word.clone()),
            ChallengePayload::Arithmetic { .. } => {
                PlayerInput::Answer(challenge.payload.expected_answer())
            }
        }
    }

    fn wrong_color(session: &Session) -> PlayerInput {
        let challenge = session.active_challenge().expect("active challenge");
        let ChallengePayload::Recall { sequence } = &challenge.payload else {
            panic!("expected recall");
        };
        let wrong = Color::ALL
            .iter()
            .copied()
            .find(|c| *c != sequence[0])
            .unwrap();
        PlayerInput::Color(wrong)
    }

    fn ticks(session: &mut Session, n: u32) {
        for _ in 0..n {
            session.tick();
        }
    }

    fn recall_without_reveal() -> SessionConfig {
        SessionConfig {
            reveal_interval_ticks: 0,
            ..SessionConfig::for_game(GameKind::MemoryChain).with_seed(3)
        }
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut session = Session::new(SessionConfig::default());
        assert!(session.start().is_ok());
        assert_eq!(session.phase(), SessionPhase::Countdown);

        let err = session.start().unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { operation: "start", .. }));
        assert!(session.finish().is_ok());
        assert!(session.start().is_err());
    }

    #[test]
    fn test_countdown_opens_input() {
        let mut session = Session::new(SessionConfig::default().with_seed(9));
        session.start().unwrap();
        assert_eq!(session.snapshot().countdown_left, Some(5));

        ticks(&mut session, 4);
        assert_eq!(session.phase(), SessionPhase::Countdown);
        assert_eq!(session.snapshot().countdown_left, Some(1));

        session.tick();
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);
        assert!(session.active_challenge().is_some());
        assert_eq!(session.snapshot().step_ticks_left, Some(6));
        assert_eq!(session.snapshot().time_left, Some(120));
    }

    #[test]
    fn test_arithmetic_session_regression() {
        let mut session = Session::new(SessionConfig::default().with_seed(42));
        session.start().unwrap();
        ticks(&mut session, 5);

        for _ in 0..5 {
            assert_eq!(session.phase(), SessionPhase::AwaitingInput);
            ticks(&mut session, 3);
            assert_eq!(session.snapshot().step_ticks_left, Some(3));

            let input = correct_input(&session);
            assert_eq!(session.submit_input(input), Some(Verdict::Correct));
            assert_eq!(session.phase(), SessionPhase::Feedback);
            session.tick();
        }

        assert_eq!(session.score(), 425);
        assert_eq!(session.streak(), 5);
        assert_eq!(session.level(), 1);
    }

    #[test]
    fn test_step_deadline_times_out_exactly() {
        let config = SessionConfig {
            countdown_ticks: 0,
            lives: Some(3),
            step_deadline: Some(DeadlinePolicy::fixed(12)),
            feedback_ticks: 2,
            ..SessionConfig::default().with_seed(1)
        };
        let mut session = Session::new(config);
        session.start().unwrap();
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);

        let input = correct_input(&session);
        session.submit_input(input);
        session.tick();
        session.tick();
        assert_eq!(session.streak(), 1);
        let opened_at = session.now();

        ticks(&mut session, 11);
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);

        session.tick();
        assert_eq!(session.now(), opened_at + 12);
        assert_eq!(session.phase(), SessionPhase::Feedback);
        assert_eq!(session.lives(), Some(2));
        assert_eq!(session.streak(), 0);
        assert_eq!(session.snapshot().last_verdict, Some(Verdict::Timeout));
        assert_eq!(session.stats().timeouts, 1);
    }

    #[test]
    fn test_answer_on_last_step_tick_wins() {
        let mut session = Session::new(SessionConfig::default().with_seed(5));
        session.start().unwrap();
        ticks(&mut session, 5);

        ticks(&mut session, 5);
        assert_eq!(session.snapshot().step_ticks_left, Some(1));
        let input = correct_input(&session);
        assert_eq!(session.submit_input(input), Some(Verdict::Correct));
        assert_eq!(session.stats().timeouts, 0);

        // The cancelled deadline must not fire on the following tick.
        session.tick();
        assert_eq!(session.snapshot().last_verdict, Some(Verdict::Correct));
        assert_eq!(session.streak(), 1);
    }

    #[test]
    fn test_answer_after_deadline_tick_is_ignored() {
        let mut session = Session::new(SessionConfig::default().with_seed(5));
        session.start().unwrap();
        ticks(&mut session, 5);
        let input = correct_input(&session);

        ticks(&mut session, 6);
        assert_eq!(session.phase(), SessionPhase::Feedback);
        assert_eq!(session.snapshot().last_verdict, Some(Verdict::Timeout));

        let score = session.score();
        assert_eq!(session.submit_input(input), None);
        assert_eq!(session.score(), score);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.stats().timeouts, 1);
    }

    #[test]
    fn test_skip_breaks_streak_and_issues_next_word() {
        let config = SessionConfig {
            countdown_ticks: 0,
            ..SessionConfig::for_game(GameKind::WordBlitz).with_seed(12)
        };
        let mut session = Session::new(config);
        session.start().unwrap();

        let input = correct_input(&session);
        assert_eq!(session.submit_input(input), Some(Verdict::Correct));
        session.tick();
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);
        assert_eq!(session.streak(), 1);

        let score = session.score();
        let skipped_id = session.active_challenge().unwrap().id;
        session.take_events();

        assert_eq!(session.submit_input(PlayerInput::Skip), Some(Verdict::Skipped));
        assert_eq!(session.streak(), 0);
        assert_eq!(session.score(), score);
        assert_eq!(session.stats().attempts, 2);
        assert_eq!(session.stats().skipped, 1);
        assert_eq!(session.stats().correct, 1);

        // Next word at once, with a fresh step deadline.
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);
        let next = session.active_challenge().unwrap();
        assert_eq!(next.id, skipped_id + 1);
        assert_eq!(next.expires_at, Some(session.now() + 5));

        let events = session.take_events();
        assert!(events.iter().any(|e| matches!(
            e.data,
            SessionEventData::Verdict { verdict: Verdict::Skipped, challenge_id } if challenge_id == skipped_id
        )));
        assert!(events.iter().any(|e| matches!(
            e.data,
            SessionEventData::ChallengeIssued { challenge_id, .. } if challenge_id == skipped_id + 1
        )));
    }

    #[test]
    fn test_skip_keeps_lives() {
        let mut session = Session::new(recall_without_reveal());
        session.start().unwrap();
        ticks(&mut session, 2);

        for _ in 0..4 {
            assert_eq!(session.submit_input(PlayerInput::Skip), Some(Verdict::Skipped));
        }
        assert_eq!(session.lives(), Some(3));
        assert!(session.phase().is_running());
        assert_eq!(session.stats().skipped, 4);
    }

    #[test]
    fn test_skip_ignored_outside_input_window() {
        let mut session = Session::new(SessionConfig::default());
        assert_eq!(session.submit_input(PlayerInput::Skip), None);
        session.start().unwrap();
        assert_eq!(session.submit_input(PlayerInput::Skip), None);
        assert_eq!(session.stats().attempts, 0);
    }

    #[test]
    fn test_three_lives_finish_on_third_miss() {
        let mut session = Session::new(recall_without_reveal());
        session.start().unwrap();
        ticks(&mut session, 2);

        for miss in 1..=3u32 {
            assert_eq!(session.phase(), SessionPhase::AwaitingInput);
            let input = wrong_color(&session);
            assert_eq!(session.submit_input(input), Some(Verdict::Incorrect));
            assert_eq!(session.lives(), Some(3 - miss));

            if miss < 3 {
                assert_eq!(session.phase(), SessionPhase::Feedback);
                ticks(&mut session, 2);
            }
        }

        assert_eq!(session.phase(), SessionPhase::Finished);
        let events = session.take_events();
        assert!(events.iter().any(|e| e.is_finished()));
    }

    #[test]
    fn test_recall_reveals_then_levels_up() {
        let config = SessionConfig::for_game(GameKind::MemoryChain).with_seed(8);
        let mut session = Session::new(config);
        session.start().unwrap();
        ticks(&mut session, 2);

        assert_eq!(session.phase(), SessionPhase::Showing);
        let sequence = match &session.active_challenge().unwrap().payload {
            ChallengePayload::Recall { sequence } => sequence.clone(),
            other => panic!("unexpected payload {other:?}"),
        };
        assert_eq!(sequence.len(), 3);
        assert_eq!(session.snapshot().revealed, 1);

        ticks(&mut session, 2);
        assert_eq!(session.snapshot().revealed, 3);
        assert_eq!(session.phase(), SessionPhase::Showing);
        session.tick();
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);
        assert_eq!(session.snapshot().step_ticks_left, Some(19));

        for (i, color) in sequence.iter().enumerate() {
            let verdict = session.submit_input(PlayerInput::Color(*color));
            if i + 1 < sequence.len() {
                assert_eq!(verdict, Some(Verdict::Partial));
                assert_eq!(session.phase(), SessionPhase::AwaitingInput);
            } else {
                assert_eq!(verdict, Some(Verdict::Correct));
            }
        }

        assert_eq!(session.score(), 30 + 50);
        assert_eq!(session.level(), 2);
        assert_eq!(session.phase(), SessionPhase::Feedback);

        ticks(&mut session, 2);
        assert_eq!(session.phase(), SessionPhase::Showing);
        match &session.active_challenge().unwrap().payload {
            ChallengePayload::Recall { sequence } => assert_eq!(sequence.len(), 4),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_clicker_runs_until_time_up() {
        let mut session = Session::new(SessionConfig::for_game(GameKind::SpeedClicker));
        session.start().unwrap();
        ticks(&mut session, 3);
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);

        for _ in 0..12 {
            assert_eq!(session.submit_input(PlayerInput::Click), Some(Verdict::Correct));
        }
        // Ten singles then two doubles
        assert_eq!(session.score(), 14);
        assert_eq!(session.snapshot().multiplier, 2);
        assert_eq!(session.snapshot().inputs_last_second, 12);

        session.tick();
        assert_eq!(session.snapshot().inputs_last_second, 0);

        ticks(&mut session, 8);
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);
        let result = session.tick();
        assert!(result.finished);
        assert_eq!(session.phase(), SessionPhase::Finished);
    }

    #[test]
    fn test_word_prefix_keeps_step_open() {
        let config = SessionConfig::for_game(GameKind::WordBlitz).with_seed(4);
        let mut session = Session::new(config);
        session.start().unwrap();
        ticks(&mut session, 3);

        let ChallengePayload::Word { word } = session.active_challenge().unwrap().payload.clone() else {
            panic!("expected a word");
        };
        let prefix: String = word.chars().take(2).collect();
        assert_eq!(session.submit_input(PlayerInput::Text(prefix)), Some(Verdict::Partial));
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);

        assert_eq!(session.submit_input(PlayerInput::Text(word.clone())), Some(Verdict::Correct));
        assert_eq!(session.score(), u64::from(10 + 2 * word.len() as u32));
    }

    #[test]
    fn test_malformed_counts_as_incorrect() {
        let mut session = Session::new(SessionConfig::default().with_seed(2));
        session.start().unwrap();
        ticks(&mut session, 5);
        let input = correct_input(&session);
        session.submit_input(input);
        ticks(&mut session, 1);

        assert_eq!(session.submit_input(PlayerInput::Answer("abc".into())), Some(Verdict::Malformed));
        assert_eq!(session.streak(), 0);
        assert_eq!(session.stats().attempts, 2);
        assert_eq!(session.stats().accuracy_pct(), 50);
    }

    #[test]
    fn test_empty_answer_ignored() {
        let mut session = Session::new(SessionConfig::default().with_seed(2));
        session.start().unwrap();
        ticks(&mut session, 5);

        assert_eq!(session.submit_input(PlayerInput::Answer("".into())), Some(Verdict::Partial));
        assert_eq!(session.phase(), SessionPhase::AwaitingInput);
        assert_eq!(session.stats().attempts, 0);
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut session = Session::new(SessionConfig::default().with_seed(6));
        session.start().unwrap();
        ticks(&mut session, 5);
        let input = correct_input(&session);
        session.submit_input(input);
        session.finish().unwrap();

        let before = session.snapshot();
        assert_eq!(session.submit_input(PlayerInput::Answer("1".into())), None);
        let result = session.tick();
        assert_eq!(result.timers_fired, 0);
        assert_eq!(session.score(), before.score);
        assert_eq!(session.streak(), before.streak);
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_reset_restores_initial_snapshot_from_every_phase() {
        let initial = Session::new(SessionConfig::for_game(GameKind::MemoryChain).with_seed(5)).snapshot();

        let reach = |steps: u32, answer: bool| {
            let mut session = Session::new(SessionConfig::for_game(GameKind::MemoryChain).with_seed(5));
            session.start().unwrap();
            ticks(&mut session, steps);
            if answer {
                let input = wrong_color(&session);
                session.submit_input(input);
            }
            session
        };

        let mut sessions = vec![
            Session::new(SessionConfig::for_game(GameKind::MemoryChain).with_seed(5)),
            reach(0, false),
            reach(2, false),
            reach(5, false),
            reach(5, true),
        ];
        let mut finished = reach(5, true);
        finished.finish().unwrap();
        sessions.push(finished);

        let phases: Vec<_> = sessions.iter().map(|s| s.phase()).collect();
        assert_eq!(
            phases,
            vec![
                SessionPhase::Idle,
                SessionPhase::Countdown,
                SessionPhase::Showing,
                SessionPhase::AwaitingInput,
                SessionPhase::Feedback,
                SessionPhase::Finished,
            ]
        );

        for mut session in sessions {
            let generation = session.generation();
            session.reset();
            assert_eq!(session.snapshot(), initial);
            assert!(session.generation() > generation);
            assert_eq!(session.pending_timers().count(), 0);
        }
    }

    #[test]
    fn test_stale_timer_never_mutates() {
        let mut session = Session::new(SessionConfig::default().with_seed(12));
        session.start().unwrap();
        ticks(&mut session, 5);
        let stale: Vec<_> = session.pending_timers().cloned().collect();
        assert!(!stale.is_empty());

        session.reset();
        let after_reset = session.snapshot();
        for timer in stale.iter().cloned() {
            assert!(!session.fire_timer(timer));
        }
        assert_eq!(session.snapshot(), after_reset);

        // Still ignored once a new round is running
        session.start().unwrap();
        ticks(&mut session, 5);
        let running = session.snapshot();
        let hash = session.compute_hash();
        for timer in stale {
            assert!(!session.fire_timer(timer));
        }
        assert_eq!(session.snapshot(), running);
        assert_eq!(session.compute_hash(), hash);
    }

    #[test]
    fn test_answered_deadline_is_ignored() {
        let mut session = Session::new(SessionConfig::default().with_seed(12));
        session.start().unwrap();
        ticks(&mut session, 5);
        let deadline = session
            .pending_timers()
            .find(|t| matches!(t.kind, SessionTimer::StepDeadline { .. }))
            .cloned()
            .unwrap();

        let input = correct_input(&session);
        session.submit_input(input);
        session.tick();
        let streak = session.streak();
        assert!(!session.fire_timer(deadline));
        assert_eq!(session.streak(), streak);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = || {
            let mut session = Session::new(SessionConfig::for_game(GameKind::WordBlitz).with_seed(77));
            session.start().unwrap();
            ticks(&mut session, 3);
            for _ in 0..4 {
                let input = correct_input(&session);
                session.submit_input(input);
                ticks(&mut session, 1);
            }
            session.compute_hash()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_seeded_fuzz_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);

        for kind in GameKind::ALL {
            let mut session = Session::new(SessionConfig::for_game(kind).with_seed(rng.gen()));
            session.start().unwrap();

            for _ in 0..400 {
                let score_before = session.score();
                let streak_before = session.streak();
                let finished_before = session.is_finished();

                match rng.gen_range(0..10) {
                    0..=4 => {
                        session.tick();
                    }
                    5 => session.reset(),
                    6 => {
                        let _ = session.start();
                    }
                    _ => {
                        let input = if session.active_challenge().is_some() && rng.gen_bool(0.6) {
                            correct_input(&session)
                        } else {
                            PlayerInput::Answer(rng.gen_range(-5..50).to_string())
                        };
                        if let Some(verdict) = session.submit_input(input) {
                            match verdict {
                                Verdict::Correct => assert_eq!(session.streak(), streak_before + 1),
                                Verdict::Partial => assert_eq!(session.streak(), streak_before),
                                _ => assert_eq!(session.streak(), 0),
                            }
                        }
                    }
                }

                if finished_before && session.is_finished() {
                    assert_eq!(session.score(), score_before);
                    assert_eq!(session.streak(), streak_before);
                }
                if session.phase() != SessionPhase::Idle {
                    assert!(session.score() >= score_before || session.phase() == SessionPhase::Countdown);
                }
                assert!(session.level() >= 1);
            }
        }
    }
}
