//! Game Logic Module
//!
//! Everything that happens inside one challenge round. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `config`: Game kinds and per-game session presets
//! - `catalogue`: Lobby listings
//! - `challenge`: Challenge payloads, generator and judging
//! - `scoring`: Points, streaks and multipliers
//! - `session`: The session state machine
//! - `events`: Session notifications
//! - `replay`: Input logs and replay verification

pub mod config;
pub mod catalogue;
pub mod challenge;
pub mod scoring;
pub mod session;
pub mod events;
pub mod replay;

// Re-export key types
pub use config::{DeadlinePolicy, GameKind, SessionConfig};
pub use challenge::{
    Challenge, ChallengeGenerator, ChallengePayload, ChallengeProgress, Color, Operator,
    PlayerInput, Verdict,
};
pub use scoring::{score, MultiplierTier, ScoreInput, ScoreOutcome, ScoringRules};
pub use session::{Session, SessionPhase, SessionSnapshot, SessionStats, SessionTimer, TickResult};
pub use events::{SessionEvent, SessionEventData};
pub use replay::{replay_session, InputLog, LogEntry, Recorder, ReplayError};
