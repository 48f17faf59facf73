//! Tournament Module
//!
//! Multi-participant rounds with a live leaderboard. Deterministic like
//! `game/`: synthetic opponents draw from a seeded stream and ranks are a
//! pure function of the roster.
//!
//! ## Module Structure
//!
//! - `roster`: Participants and the ranking rule
//! - `aggregator`: Tournament lifecycle, synthetic opponents, prizes
//! - `events`: Tournament notifications
//! - `arena`: A session merged with a tournament

pub mod roster;
pub mod aggregator;
pub mod events;
pub mod arena;

// Re-export key types
pub use roster::{default_opponents, rank_participants, Participant, ParticipantId};
pub use aggregator::{
    PrizeAward, SyntheticConfig, Tournament, TournamentConfig, TournamentId, TournamentStatus,
    TournamentTimer,
};
pub use events::{TournamentEvent, TournamentEventData};
pub use arena::{Arena, ArenaEvent, ArenaOutcome};
