//! Tournament roster and ranking.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::{StateHash, StateHasher};

/// Participant identifier. Lower ids win ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One roster entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier
    pub id: ParticipantId,
    /// Name shown on the leaderboard
    pub display_name: String,
    /// Score
    pub score: u64,
    /// Current streak
    pub streak: u32,
    /// Correct answers
    pub correct: u32,
    /// 1-based rank; 0 until first ranked
    pub rank: u32,
    /// Driven by a person rather than the synthetic opponent model
    pub is_real: bool,
}

impl Participant {
    /// Real participant with a zero score.
    pub fn real(id: u32, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, true)
    }

    /// Synthetic opponent with a zero score.
    pub fn synthetic(id: u32, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, false)
    }

    fn new(id: u32, display_name: impl Into<String>, is_real: bool) -> Self {
        Self {
            id: ParticipantId(id),
            display_name: display_name.into(),
            score: 0,
            streak: 0,
            correct: 0,
            rank: 0,
            is_real,
        }
    }

    /// Zero score, streak and correct count.
    pub fn clear_progress(&mut self) {
        self.score = 0;
        self.streak = 0;
        self.correct = 0;
    }
}

/// Default synthetic opponents.
pub fn default_opponents() -> Vec<Participant> {
    ["MathWizard", "NumberNinja", "Calculator", "QuickSum", "BrainPower"]
        .iter()
        .zip(2u32..)
        .map(|(name, id)| Participant::synthetic(id, *name))
        .collect()
}

/// Sort by score descending, then id ascending, and assign `rank = index + 1`.
///
/// Returns true if the order or any rank changed. Running it twice in a
/// row without score changes returns false the second time.
pub fn rank_participants(roster: &mut [Participant]) -> bool {
    let before: Vec<(ParticipantId, u32)> = roster.iter().map(|p| (p.id, p.rank)).collect();

    roster.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    for (index, participant) in roster.iter_mut().enumerate() {
        participant.rank = index as u32 + 1;
    }

    roster
        .iter()
        .map(|p| (p.id, p.rank))
        .ne(before.into_iter())
}

/// Digest of the ranked roster.
pub fn roster_hash(roster: &[Participant]) -> StateHash {
    let mut hasher = StateHasher::for_roster();
    hasher.update_u32(roster.len() as u32);
    for p in roster {
        hasher.update_u32(p.id.0);
        hasher.update_u64(p.score);
        hasher.update_u32(p.streak);
        hasher.update_u32(p.correct);
        hasher.update_u32(p.rank);
        hasher.update_bool(p.is_real);
    }
    hasher.finalize()
}
