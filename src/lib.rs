//! # Skill Arena
//!
//! Deterministic timed-challenge engine: solo skill sessions and
//! tournaments with a live leaderboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SKILL ARENA                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── clock.rs    - Tick sources (interval, manual)           │
//! │  ├── rng.rs      - Xorshift128+ PRNG, per-round seeds        │
//! │  ├── hash.rs     - State hashing for replay checks           │
//! │  └── timer.rs    - Timer queue and cancellation guard        │
//! │                                                              │
//! │  game/           - One challenge round (deterministic)       │
//! │  ├── challenge.rs- Payloads, generator, judging              │
//! │  ├── scoring.rs  - Points, streaks, multipliers              │
//! │  ├── session.rs  - Session state machine                     │
//! │  └── replay.rs   - Input logs and verification               │
//! │                                                              │
//! │  tournament/     - Leaderboard (deterministic)               │
//! │  ├── roster.rs   - Participants and ranking                  │
//! │  ├── aggregator.rs - Lifecycle, synthetic opponents, prizes  │
//! │  └── arena.rs    - Session merged with a tournament          │
//! │                                                              │
//! │  driver/         - Async tick driver (non-deterministic)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `game/` and `tournament/` modules never read the wall clock:
//! - Time advances only through `tick()`
//! - No HashMap (BTreeMap and Vec for ordered iteration)
//! - All randomness from seeded Xorshift128+, re-derived per round
//! - Every timer carries the generation it was scheduled under
//!
//! Given the same config and the same sequence of ticks and inputs, a
//! session produces the same state hash on every platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod game;
pub mod tournament;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig};
pub use core::rng::DeterministicRng;
pub use error::EngineError;
pub use game::{GameKind, PlayerInput, Session, SessionConfig, SessionEvent, SessionPhase, Verdict};
pub use tournament::{Arena, Participant, ParticipantId, Tournament, TournamentConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default clock rate (Hz). Game presets count in seconds.
pub const DEFAULT_TICK_RATE: u32 = 1;
