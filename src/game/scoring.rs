//! Scoring and Streak Engine
//!
//! A pure function from one judged answer to the points it earns and the
//! streak that follows. No randomness, no clock reads: the same
//! [`ScoreInput`] always yields the same [`ScoreOutcome`].

use serde::{Serialize, Deserialize};

/// Streak threshold at which a base-points multiplier kicks in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierTier {
    /// Minimum streak for this tier.
    pub min_streak: u32,
    /// Multiplier applied to base points.
    pub multiplier: u32,
}

/// Per-game scoring constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Points for any correct answer, before multiplier.
    pub base_points: u32,
    /// Points per unit of challenge size (word characters, recall elements).
    pub weight_bonus_per_unit: u32,
    /// Points per remaining step tick beyond the grace ticks.
    pub speed_bonus_per_tick: u32,
    /// Remaining ticks that earn no speed bonus.
    pub speed_grace_ticks: u32,
    /// Upper bound of the speed bonus.
    pub speed_bonus_cap: u32,
    /// Points per streak step before the answer.
    pub streak_bonus_rate: u32,
    /// Upper bound of the streak bonus.
    pub streak_bonus_cap: u32,
    /// Points per difficulty level.
    pub level_bonus_per_level: u32,
    /// Bonus for completing a challenge with no mistake since the last success.
    pub flawless_bonus: u32,
    /// Multiplier tiers in ascending streak order.
    pub multiplier_tiers: Vec<MultiplierTier>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_points: 1,
            weight_bonus_per_unit: 0,
            speed_bonus_per_tick: 0,
            speed_grace_ticks: 0,
            speed_bonus_cap: 0,
            streak_bonus_rate: 0,
            streak_bonus_cap: 0,
            level_bonus_per_level: 0,
            flawless_bonus: 0,
            multiplier_tiers: Vec::new(),
        }
    }
}

impl ScoringRules {
    /// Reflex clicking: one point per click, multiplied by streak tier.
    pub fn reflex() -> Self {
        Self {
            base_points: 1,
            multiplier_tiers: vec![
                MultiplierTier { min_streak: 10, multiplier: 2 },
                MultiplierTier { min_streak: 20, multiplier: 3 },
                MultiplierTier { min_streak: 30, multiplier: 4 },
                MultiplierTier { min_streak: 50, multiplier: 5 },
            ],
            ..Self::default()
        }
    }

    /// Sequence recall: ten points per element, fifty for a flawless run.
    pub fn recall() -> Self {
        Self {
            base_points: 0,
            weight_bonus_per_unit: 10,
            flawless_bonus: 50,
            ..Self::default()
        }
    }

    /// Typed words: base plus two per character plus a capped streak bonus.
    pub fn typing() -> Self {
        Self {
            base_points: 10,
            weight_bonus_per_unit: 2,
            streak_bonus_rate: 5,
            streak_bonus_cap: 50,
            ..Self::default()
        }
    }

    /// Arithmetic sprint: base, speed, streak and difficulty bonuses.
    pub fn arithmetic() -> Self {
        Self {
            base_points: 25,
            speed_bonus_per_tick: 10,
            speed_grace_ticks: 1,
            speed_bonus_cap: 50,
            streak_bonus_rate: 15,
            streak_bonus_cap: 100,
            level_bonus_per_level: 10,
            ..Self::default()
        }
    }

    /// Multiplier in effect for a given streak.
    pub fn multiplier_for(&self, streak: u32) -> u32 {
        self.multiplier_tiers
            .iter()
            .filter(|tier| streak >= tier.min_streak)
            .map(|tier| tier.multiplier)
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

/// Everything the scoring function needs to know about one answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInput {
    /// Answer matched the challenge.
    pub is_correct: bool,
    /// Answer arrived before the step deadline.
    pub is_on_time: bool,
    /// Streak before this answer.
    pub streak_before: u32,
    /// Session level.
    pub level: u32,
    /// Step ticks left when the answer was judged.
    pub remaining_step_ticks: u32,
    /// Challenge size (characters, elements).
    pub weight: u32,
    /// No mistake since the previous success.
    pub flawless: bool,
}

/// Result of scoring one answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Points awarded.
    pub points: u32,
    /// Streak after this answer.
    pub new_streak: u32,
    /// Multiplier in effect after this answer.
    pub multiplier: u32,
    /// A life is forfeited (only meaningful for life-limited games).
    pub life_lost: bool,
}

impl ScoreOutcome {
    /// Outcome of a wrong answer or a timeout.
    pub const MISS: Self = Self {
        points: 0,
        new_streak: 0,
        multiplier: 1,
        life_lost: true,
    };
}

/// Score one judged answer.
pub fn score(rules: &ScoringRules, input: &ScoreInput) -> ScoreOutcome {
    if !(input.is_correct && input.is_on_time) {
        return ScoreOutcome::MISS;
    }

    let multiplier = rules.multiplier_for(input.streak_before);
    let base = rules.base_points.saturating_mul(multiplier);

    let weight = input.weight.saturating_mul(rules.weight_bonus_per_unit);

    let speed = input
        .remaining_step_ticks
        .saturating_sub(rules.speed_grace_ticks)
        .saturating_mul(rules.speed_bonus_per_tick)
        .min(rules.speed_bonus_cap);

    let streak = input
        .streak_before
        .saturating_mul(rules.streak_bonus_rate)
        .min(rules.streak_bonus_cap);

    let level = input.level.saturating_mul(rules.level_bonus_per_level);

    let flawless = if input.flawless { rules.flawless_bonus } else { 0 };

    let points = base
        .saturating_add(weight)
        .saturating_add(speed)
        .saturating_add(streak)
        .saturating_add(level)
        .saturating_add(flawless);

    let new_streak = input.streak_before.saturating_add(1);

    ScoreOutcome {
        points,
        new_streak,
        multiplier: rules.multiplier_for(new_streak),
        life_lost: false,
    }
}
