//! Engine errors.
//!
//! Gameplay mistakes (wrong answers, out-of-range input) are verdicts, not
//! errors. What remains are operations attempted in the wrong state and
//! roster bookkeeping failures.

use crate::tournament::ParticipantId;

/// Errors returned by session, tournament and arena operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Operation not legal in the current state.
    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        /// Attempted operation.
        operation: &'static str,
        /// State at the time of the attempt.
        state: String,
    },

    /// Roster already at capacity.
    #[error("Tournament is full ({capacity} participants)")]
    TournamentFull {
        /// Roster capacity.
        capacity: usize,
    },

    /// Participant already on the roster.
    #[error("Participant {0} already joined")]
    DuplicateParticipant(ParticipantId),

    /// Participant not on the roster.
    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),
}

impl EngineError {
    /// Build an invalid transition error from any displayable state.
    pub fn invalid(operation: &'static str, state: impl std::fmt::Display) -> Self {
        EngineError::InvalidTransition {
            operation,
            state: state.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::invalid("start", "countdown");
        assert_eq!(err.to_string(), "Cannot start while countdown");

        let err = EngineError::ParticipantNotFound(ParticipantId(7));
        assert_eq!(err.to_string(), "Participant #7 not found");
    }
}
