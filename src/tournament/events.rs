//! Tournament Events

use serde::{Serialize, Deserialize};

use crate::core::Tick;
use super::aggregator::{PrizeAward, TournamentStatus};
use super::roster::{Participant, ParticipantId};

/// Tournament event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentEventData {
    /// Status changed
    StatusChanged {
        /// Previous status
        from: TournamentStatus,
        /// New status
        to: TournamentStatus,
    },

    /// Participant joined the lobby
    ParticipantJoined {
        /// Who joined
        participant: ParticipantId,
        /// Roster size after the join
        roster_size: usize,
    },

    /// Scores, streaks or ranks changed
    LeaderboardUpdated {
        /// Full roster in rank order
        standings: Vec<Participant>,
    },

    /// Tournament over
    TournamentFinished {
        /// Final roster in rank order
        standings: Vec<Participant>,
        /// Prizes handed out
        awards: Vec<PrizeAward>,
    },
}

/// A tournament event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentEvent {
    /// Tournament tick when the event occurred
    pub tick: Tick,

    /// Event data
    pub data: TournamentEventData,
}

impl TournamentEvent {
    /// Create a new event.
    pub fn new(tick: Tick, data: TournamentEventData) -> Self {
        Self { tick, data }
    }

    /// Create status changed event.
    pub fn status_changed(tick: Tick, from: TournamentStatus, to: TournamentStatus) -> Self {
        Self::new(tick, TournamentEventData::StatusChanged { from, to })
    }

    /// Create leaderboard updated event.
    pub fn leaderboard_updated(tick: Tick, standings: Vec<Participant>) -> Self {
        Self::new(tick, TournamentEventData::LeaderboardUpdated { standings })
    }

    /// Whether this is the terminal event.
    pub fn is_finished(&self) -> bool {
        matches!(self.data, TournamentEventData::TournamentFinished { .. })
    }
}
