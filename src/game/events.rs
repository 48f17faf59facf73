//! Session Events
//!
//! Notifications emitted by a session for presentation layers, the arena
//! and the async driver. Events queue up inside the session and are drained
//! with [`Session::take_events`](super::session::Session::take_events).

use serde::{Serialize, Deserialize};

use crate::core::{Generation, Tick};
use super::challenge::{Color, Verdict};
use super::session::SessionPhase;

/// Session event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventData {
    /// Phase changed
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
    },

    /// A new challenge is on screen
    ChallengeIssued {
        challenge_id: u32,
        prompt: String,
        level: u32,
    },

    /// One recall element revealed
    ElementRevealed {
        challenge_id: u32,
        index: usize,
        color: Color,
    },

    /// Input window opened for the active challenge
    InputOpened {
        challenge_id: u32,
        expires_at: Option<Tick>,
    },

    /// A step was judged
    Verdict {
        challenge_id: u32,
        verdict: Verdict,
    },

    /// Score or streak changed
    ScoreChanged {
        points: u32,
        score: u64,
        streak: u32,
        multiplier: u32,
    },

    /// A life was lost
    LifeLost {
        lives_left: u32,
    },

    /// Level raised after a success
    LevelUp {
        level: u32,
    },

    /// Round over
    SessionFinished {
        final_score: u64,
        challenges_completed: u32,
        best_streak: u32,
        final_rank: Option<u32>,
    },
}

/// A session event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Session tick when the event occurred
    pub tick: Tick,

    /// Round the event belongs to
    pub generation: Generation,

    /// Event data
    pub data: SessionEventData,
}

impl SessionEvent {
    /// Create a new event.
    pub fn new(tick: Tick, generation: Generation, data: SessionEventData) -> Self {
        Self { tick, generation, data }
    }

    /// Create phase changed event.
    pub fn phase_changed(
        tick: Tick,
        generation: Generation,
        from: SessionPhase,
        to: SessionPhase,
    ) -> Self {
        Self::new(tick, generation, SessionEventData::PhaseChanged { from, to })
    }

    /// Create verdict event.
    pub fn verdict(tick: Tick, generation: Generation, challenge_id: u32, verdict: Verdict) -> Self {
        Self::new(tick, generation, SessionEventData::Verdict { challenge_id, verdict })
    }

    /// Create score changed event.
    pub fn score_changed(
        tick: Tick,
        generation: Generation,
        points: u32,
        score: u64,
        streak: u32,
        multiplier: u32,
    ) -> Self {
        Self::new(
            tick,
            generation,
            SessionEventData::ScoreChanged {
                points,
                score,
                streak,
                multiplier,
            },
        )
    }

    /// Create session finished event.
    pub fn session_finished(
        tick: Tick,
        generation: Generation,
        final_score: u64,
        challenges_completed: u32,
        best_streak: u32,
        final_rank: Option<u32>,
    ) -> Self {
        Self::new(
            tick,
            generation,
            SessionEventData::SessionFinished {
                final_score,
                challenges_completed,
                best_streak,
                final_rank,
            },
        )
    }

    /// Whether this is the terminal event of a round.
    pub fn is_finished(&self) -> bool {
        matches!(self.data, SessionEventData::SessionFinished { .. })
    }
}
