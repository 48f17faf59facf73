//! Async Tick Driver (non-deterministic layer)
//!
//! Runs one session or arena inside a tokio task. Ticks come from a
//! [`ClockSource`](crate::core::ClockSource), player commands arrive on an
//! `mpsc` channel and notifications leave on a `broadcast` channel. Queued
//! commands are always applied before the next tick, so an input that
//! reaches the driver before the deadline tick wins.

pub mod runner;

use serde::{Serialize, Deserialize};

use crate::error::EngineError;
use crate::game::{PlayerInput, Session, SessionEvent, Verdict};
use crate::tournament::{Arena, ArenaEvent};

pub use runner::{run, spawn, Command, DriverHandle, DriverReport};

/// Summary of the round an engine is running.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Score so far
    pub final_score: u64,
    /// Correct answers
    pub challenges_completed: u32,
    /// Best streak
    pub best_streak: u32,
    /// Tournament rank, when playing in an arena
    pub final_rank: Option<u32>,
    /// Prize won, when playing in an arena
    pub prize: Option<String>,
    /// Whether the round is over
    pub finished: bool,
    /// Session state hash (hex)
    pub state_hash: String,
}

/// Something the driver can run.
pub trait Engine: Send + 'static {
    /// Notification type.
    type Event: Clone + Send + std::fmt::Debug + 'static;

    /// Begin a round.
    fn start(&mut self) -> Result<(), EngineError>;

    /// Apply a player input.
    fn submit_input(&mut self, input: PlayerInput) -> Option<Verdict>;

    /// Advance one tick.
    fn tick(&mut self);

    /// End the round early.
    fn finish(&mut self) -> Result<(), EngineError>;

    /// Back to idle.
    fn reset(&mut self);

    /// Drain notifications.
    fn take_events(&mut self) -> Vec<Self::Event>;

    /// Whether the round is over.
    fn is_finished(&self) -> bool;

    /// Current summary.
    fn summary(&self) -> RoundSummary;
}

impl Engine for Session {
    type Event = SessionEvent;

    fn start(&mut self) -> Result<(), EngineError> {
        Session::start(self)
    }

    fn submit_input(&mut self, input: PlayerInput) -> Option<Verdict> {
        Session::submit_input(self, input)
    }

    fn tick(&mut self) {
        Session::tick(self);
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        Session::finish(self)
    }

    fn reset(&mut self) {
        Session::reset(self)
    }

    fn take_events(&mut self) -> Vec<SessionEvent> {
        Session::take_events(self)
    }

    fn is_finished(&self) -> bool {
        Session::is_finished(self)
    }

    fn summary(&self) -> RoundSummary {
        let snapshot = self.snapshot();
        RoundSummary {
            final_score: snapshot.score,
            challenges_completed: snapshot.stats.correct,
            best_streak: snapshot.best_streak,
            final_rank: None,
            prize: None,
            finished: self.is_finished(),
            state_hash: hex::encode(self.compute_hash()),
        }
    }
}

impl Engine for Arena {
    type Event = ArenaEvent;

    fn start(&mut self) -> Result<(), EngineError> {
        Arena::start(self)
    }

    fn submit_input(&mut self, input: PlayerInput) -> Option<Verdict> {
        Arena::submit_input(self, input)
    }

    fn tick(&mut self) {
        Arena::tick(self)
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        Arena::finish(self)
    }

    fn reset(&mut self) {
        Arena::reset(self)
    }

    fn take_events(&mut self) -> Vec<ArenaEvent> {
        Arena::take_events(self)
    }

    fn is_finished(&self) -> bool {
        Arena::is_finished(self)
    }

    fn summary(&self) -> RoundSummary {
        let mut summary = Engine::summary(self.session());
        summary.finished = self.is_finished();
        if let Some(outcome) = self.outcome() {
            summary.final_rank = Some(outcome.final_rank);
            summary.prize = outcome.prize.clone();
        } else {
            summary.final_rank = self
                .tournament()
                .participant(self.real_participant())
                .map(|p| p.rank);
        }
        summary
    }
}
