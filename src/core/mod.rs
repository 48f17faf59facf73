//! Core deterministic primitives.
//!
//! Time, randomness, hashing and timer bookkeeping shared by the session
//! engine and the tournament aggregator.

pub mod clock;
pub mod hash;
pub mod rng;
pub mod timer;

// Re-export core types
pub use clock::{ClockSource, IntervalClock, ManualClock, ManualTicker, Tick};
pub use hash::{StateHash, StateHasher, compute_session_hash};
pub use rng::{DeterministicRng, derive_round_seed};
pub use timer::{CancelGuard, Generation, Timer, TimerId, TimerQueue};
