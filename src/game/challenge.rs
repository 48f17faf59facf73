//! Challenges: generation and judging.
//!
//! A [`Challenge`] is a tagged payload (click, recall sequence, word,
//! arithmetic problem) inside a shared envelope carrying its id and timing.
//! The [`ChallengeGenerator`] draws payloads from tiered pools with the
//! session's seeded RNG; [`Challenge::judge`] turns one player input into a
//! [`Verdict`].

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::{DeterministicRng, Tick};
use super::config::GameKind;

// =============================================================================
// PAYLOADS
// =============================================================================

/// Recall sequence element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Red.
    Red,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Purple.
    Purple,
    /// Orange.
    Orange,
}

impl Color {
    /// All colors in palette order.
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
        }
    }
}

/// Arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
}

impl Operator {
    /// Display symbol.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '×',
        }
    }

    /// Apply to two operands.
    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Operator::Add => lhs.saturating_add(rhs),
            Operator::Sub => lhs.saturating_sub(rhs),
            Operator::Mul => lhs.saturating_mul(rhs),
        }
    }
}

/// What the participant has to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengePayload {
    /// Click once.
    Click,
    /// Repeat the sequence in order.
    Recall {
        /// Colors to repeat.
        sequence: Vec<Color>,
    },
    /// Type the word exactly.
    Word {
        /// Target word.
        word: String,
    },
    /// Enter the result.
    Arithmetic {
        /// Left operand.
        lhs: i64,
        /// Operator.
        op: Operator,
        /// Right operand.
        rhs: i64,
    },
}

impl ChallengePayload {
    /// Size of the challenge in input units, fed to the weight bonus.
    pub fn weight(&self) -> u32 {
        match self {
            ChallengePayload::Click => 1,
            ChallengePayload::Recall { sequence } => sequence.len() as u32,
            ChallengePayload::Word { word } => word.chars().count() as u32,
            ChallengePayload::Arithmetic { .. } => 1,
        }
    }

    /// Expected answer in the form a participant would enter it.
    pub fn expected_answer(&self) -> String {
        match self {
            ChallengePayload::Click => String::new(),
            ChallengePayload::Recall { sequence } => sequence
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(" "),
            ChallengePayload::Word { word } => word.clone(),
            ChallengePayload::Arithmetic { lhs, op, rhs } => op.apply(*lhs, *rhs).to_string(),
        }
    }
}

impl fmt::Display for ChallengePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengePayload::Click => f.write_str("click"),
            ChallengePayload::Recall { sequence } => write!(f, "recall {} colors", sequence.len()),
            ChallengePayload::Word { word } => f.write_str(word),
            ChallengePayload::Arithmetic { lhs, op, rhs } => {
                write!(f, "{} {} {}", lhs, op.symbol(), rhs)
            }
        }
    }
}

// =============================================================================
// INPUTS AND VERDICTS
// =============================================================================

/// One discrete player action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// A click.
    Click,
    /// One recall element.
    Color(Color),
    /// The whole typed buffer after an edit.
    Text(String),
    /// A submitted answer.
    Answer(String),
    /// Give up on the current challenge and move to the next one.
    Skip,
}

/// Result of judging an input or an expired step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Correct so far; the step continues.
    Partial,
    /// Challenge completed.
    Correct,
    /// Wrong answer.
    Incorrect,
    /// Input of the wrong shape for this challenge. Scored as incorrect.
    Malformed,
    /// Step deadline passed without a complete answer.
    Timeout,
    /// Step given up by the participant. Breaks the streak, keeps lives.
    Skipped,
}

impl Verdict {
    /// Earns points and extends the streak.
    #[inline]
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }

    /// Ends the current step.
    #[inline]
    pub fn is_final(self) -> bool {
        !matches!(self, Verdict::Partial)
    }

    /// Costs a life when lives are limited.
    #[inline]
    pub fn costs_life(self) -> bool {
        matches!(self, Verdict::Incorrect | Verdict::Malformed | Verdict::Timeout)
    }
}

/// Inputs accumulated against the active challenge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// Recall elements entered so far.
    pub recalled: Vec<Color>,
    /// Current typed buffer.
    pub typed: String,
}

impl ChallengeProgress {
    /// Forget all progress.
    pub fn clear(&mut self) {
        self.recalled.clear();
        self.typed.clear();
    }
}

// =============================================================================
// CHALLENGE
// =============================================================================

/// A challenge issued to the participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Sequence number within the session.
    pub id: u32,
    /// What to do.
    pub payload: ChallengePayload,
    /// Tick the challenge was issued.
    pub issued_at: Tick,
    /// Tick at which the step is forfeited. Set when input opens.
    pub expires_at: Option<Tick>,
}

impl Challenge {
    /// Judge one input against this challenge.
    ///
    /// `Partial` means a correct prefix: the step stays open. An empty
    /// submitted answer is ignored and also reported as `Partial`.
    pub fn judge(&self, progress: &mut ChallengeProgress, input: &PlayerInput) -> Verdict {
        match (&self.payload, input) {
            (_, PlayerInput::Skip) => Verdict::Skipped,

            (ChallengePayload::Click, PlayerInput::Click) => Verdict::Correct,

            (ChallengePayload::Recall { sequence }, PlayerInput::Color(color)) => {
                let index = progress.recalled.len();
                progress.recalled.push(*color);
                match sequence.get(index) {
                    Some(expected) if expected == color => {
                        if progress.recalled.len() == sequence.len() {
                            Verdict::Correct
                        } else {
                            Verdict::Partial
                        }
                    }
                    _ => Verdict::Incorrect,
                }
            }

            (ChallengePayload::Word { word }, PlayerInput::Text(typed)) => {
                progress.typed = typed.clone();
                if typed == word {
                    Verdict::Correct
                } else if word.starts_with(typed.as_str()) {
                    Verdict::Partial
                } else {
                    Verdict::Incorrect
                }
            }

            (ChallengePayload::Arithmetic { .. }, PlayerInput::Text(typed)) => {
                progress.typed = typed.clone();
                Verdict::Partial
            }

            (ChallengePayload::Arithmetic { lhs, op, rhs }, PlayerInput::Answer(raw)) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Verdict::Partial;
                }
                progress.typed = raw.to_string();
                match raw.parse::<i64>() {
                    Ok(value) if value == op.apply(*lhs, *rhs) => Verdict::Correct,
                    Ok(_) => Verdict::Incorrect,
                    Err(_) => Verdict::Malformed,
                }
            }

            _ => Verdict::Malformed,
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

const COMMON_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "who", "boy", "did", "man", "end", "few", "got", "lot", "own", "say", "she",
    "too", "use", "way", "work", "life", "only",
];

const MEDIUM_WORDS: &[&str] = &[
    "about", "after", "again", "before", "being", "below", "could", "doing", "during", "each",
    "few", "from", "further", "having", "here", "itself", "more", "most", "other", "over",
    "same", "should", "some", "such", "than", "that", "their", "them", "these", "they", "this",
    "those", "through", "under", "until", "very", "what", "when", "where", "which", "while",
    "with", "would", "your", "people", "water", "right", "think",
];

const HARD_WORDS: &[&str] = &[
    "beautiful", "important", "interesting", "different", "possible", "necessary", "available",
    "particular", "education", "government", "development", "management", "environment",
    "experience", "technology", "community", "opportunity", "performance", "responsibility",
    "understanding", "international", "organization", "information", "application",
    "relationship", "achievement", "establishment", "investigation", "presentation",
    "administration",
];

const TECH_WORDS: &[&str] = &[
    "algorithm", "blockchain", "cryptocurrency", "database", "framework", "javascript",
    "programming", "software", "hardware", "network", "security", "protocol", "interface",
    "deployment", "repository", "container", "server", "frontend", "backend", "fullstack",
    "debugging", "testing", "optimization", "integration", "scalability",
];

/// Word pools from easiest to hardest.
const WORD_TIERS: [&[&str]; 4] = [COMMON_WORDS, MEDIUM_WORDS, HARD_WORDS, TECH_WORDS];

/// Longest recall sequence.
pub const MAX_RECALL_LENGTH: usize = 15;

/// Word tier for a number of completed words.
fn word_tier(history_len: u32) -> usize {
    match history_len {
        0..=9 => 0,
        10..=24 => 1,
        25..=39 => 2,
        _ => 3,
    }
}

/// Draws challenge payloads for one game.
#[derive(Clone, Debug)]
pub struct ChallengeGenerator {
    kind: GameKind,
    max_inputs_per_tick: u32,
}

impl ChallengeGenerator {
    /// Create a generator.
    pub fn new(kind: GameKind, max_inputs_per_tick: u32) -> Self {
        Self {
            kind,
            max_inputs_per_tick: max_inputs_per_tick.max(1),
        }
    }

    /// Game this generator serves.
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Most input units that fit in a deadline, if there is one.
    fn unit_budget(&self, deadline_ticks: Option<u32>) -> Option<usize> {
        deadline_ticks.map(|ticks| {
            ticks.max(1).saturating_mul(self.max_inputs_per_tick) as usize
        })
    }

    /// Generate the next payload.
    ///
    /// Size never exceeds `deadline_ticks * max_inputs_per_tick`.
    pub fn generate(
        &self,
        rng: &mut DeterministicRng,
        level: u32,
        history_len: u32,
        deadline_ticks: Option<u32>,
    ) -> ChallengePayload {
        let budget = self.unit_budget(deadline_ticks);
        match self.kind {
            GameKind::SpeedClicker => ChallengePayload::Click,
            GameKind::MemoryChain => Self::recall(rng, level, budget),
            GameKind::WordBlitz => Self::word(rng, history_len, budget),
            GameKind::NumberNinja => Self::arithmetic(rng, level),
        }
    }

    fn recall(rng: &mut DeterministicRng, level: u32, budget: Option<usize>) -> ChallengePayload {
        let mut length = (2 + level.max(1) as usize).min(MAX_RECALL_LENGTH);
        if let Some(budget) = budget {
            length = length.min(budget);
        }
        let length = length.max(1);

        let sequence = (0..length)
            .map(|_| Color::ALL[rng.next_int(Color::ALL.len() as u32) as usize])
            .collect();
        ChallengePayload::Recall { sequence }
    }

    fn word(rng: &mut DeterministicRng, history_len: u32, budget: Option<usize>) -> ChallengePayload {
        let fits = |w: &&str| budget.map_or(true, |b| w.chars().count() <= b);

        // Walk down from the scheduled tier until something fits.
        for tier in (0..=word_tier(history_len)).rev() {
            let candidates: Vec<&str> = WORD_TIERS[tier].iter().copied().filter(|w| fits(w)).collect();
            if let Some(word) = rng.choose(&candidates) {
                return ChallengePayload::Word { word: (*word).to_string() };
            }
        }

        let shortest = COMMON_WORDS
            .iter()
            .min_by_key(|w| w.len())
            .copied()
            .unwrap_or("a");
        ChallengePayload::Word { word: shortest.to_string() }
    }

    fn arithmetic(rng: &mut DeterministicRng, level: u32) -> ChallengePayload {
        let (lhs, op, rhs) = match level {
            0 | 1 => {
                let op = if rng.chance(50) { Operator::Add } else { Operator::Sub };
                (rng.next_int_range(1, 20), op, rng.next_int_range(1, 20))
            }
            2 => {
                if rng.chance(60) {
                    (rng.next_int_range(2, 13), Operator::Mul, rng.next_int_range(2, 13))
                } else {
                    let op = if rng.chance(50) { Operator::Add } else { Operator::Sub };
                    (rng.next_int_range(10, 59), op, rng.next_int_range(5, 34))
                }
            }
            _ => {
                let op = [Operator::Add, Operator::Sub, Operator::Mul][rng.next_int(3) as usize];
                if op == Operator::Mul {
                    (rng.next_int_range(3, 17), op, rng.next_int_range(3, 17))
                } else {
                    (rng.next_int_range(20, 119), op, rng.next_int_range(10, 59))
                }
            }
        };

        let (lhs, rhs) = if op == Operator::Sub && rhs > lhs {
            (rhs, lhs)
        } else {
            (lhs, rhs)
        };

        ChallengePayload::Arithmetic {
            lhs: i64::from(lhs),
            op,
            rhs: i64::from(rhs),
        }
    }
}
