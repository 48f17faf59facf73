//! Per-game session configuration.
//!
//! Every timing constant is expressed in ticks. The presets run at one tick
//! per second, which matches the granularity of the original timers; a
//! driver that wants finer pacing scales the tick counts along with
//! `ticks_per_second`.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::scoring::ScoringRules;

/// The challenge games the engine can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    /// Click as fast as possible before time runs out.
    SpeedClicker,
    /// Watch a color sequence, then repeat it.
    MemoryChain,
    /// Type the shown word before its timer expires.
    WordBlitz,
    /// Solve arithmetic problems against the clock.
    NumberNinja,
}

impl GameKind {
    /// Every playable game.
    pub const ALL: [GameKind; 4] = [
        GameKind::SpeedClicker,
        GameKind::MemoryChain,
        GameKind::WordBlitz,
        GameKind::NumberNinja,
    ];

    /// Catalogue slug.
    pub fn slug(self) -> &'static str {
        match self {
            GameKind::SpeedClicker => "speed-clicker",
            GameKind::MemoryChain => "memory-chain",
            GameKind::WordBlitz => "word-blitz",
            GameKind::NumberNinja => "number-ninja",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Per-step deadline as a function of level.
///
/// `ticks_for(level) = max(base - decrease * level, min, 1)`, so the
/// deadline never grows with level and never drops below one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePolicy {
    /// Deadline before any level reduction.
    pub base_ticks: u32,
    /// Ticks removed per level.
    pub decrease_per_level: u32,
    /// Floor.
    pub min_ticks: u32,
}

impl DeadlinePolicy {
    /// Same deadline at every level.
    pub const fn fixed(ticks: u32) -> Self {
        Self {
            base_ticks: ticks,
            decrease_per_level: 0,
            min_ticks: ticks,
        }
    }

    /// Deadline for a level.
    pub fn ticks_for(&self, level: u32) -> u32 {
        self.base_ticks
            .saturating_sub(self.decrease_per_level.saturating_mul(level))
            .max(self.min_ticks)
            .max(1)
    }
}

/// Configuration of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Which game to run.
    pub kind: GameKind,
    /// Base seed; each round derives its own stream from it.
    pub seed: u64,
    /// Driver tick rate. Only used for per-second statistics.
    pub ticks_per_second: u32,
    /// Ticks between `start` and the first challenge.
    ///
    /// Game presets use 2 to 5. Any value is accepted: 0 opens the first
    /// challenge inside `start`, and an arena replaces it with the
    /// tournament countdown.
    pub countdown_ticks: u32,
    /// Whole-session limit, if any.
    pub session_duration_ticks: Option<u32>,
    /// Starting lives, `None` for unlimited.
    pub lives: Option<u32>,
    /// Per-step deadline, `None` for no per-step limit.
    pub step_deadline: Option<DeadlinePolicy>,
    /// Ticks each recall element stays on screen.
    pub reveal_interval_ticks: u32,
    /// Ticks the verdict is displayed. Zero skips the feedback phase.
    pub feedback_ticks: u32,
    /// Raise the level by one after each correct challenge.
    pub advance_level_on_success: bool,
    /// Most inputs a participant can realistically enter per tick.
    pub max_inputs_per_tick: u32,
    /// Point rules.
    pub scoring: ScoringRules,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_game(GameKind::NumberNinja)
    }
}

impl SessionConfig {
    /// Preset for a game.
    pub fn for_game(kind: GameKind) -> Self {
        let base = Self {
            kind,
            seed: 0,
            ticks_per_second: 1,
            countdown_ticks: 3,
            session_duration_ticks: None,
            lives: None,
            step_deadline: None,
            reveal_interval_ticks: 0,
            feedback_ticks: 0,
            advance_level_on_success: false,
            max_inputs_per_tick: 8,
            scoring: ScoringRules::default(),
        };

        match kind {
            GameKind::SpeedClicker => Self {
                session_duration_ticks: Some(10),
                scoring: ScoringRules::reflex(),
                ..base
            },
            GameKind::MemoryChain => Self {
                countdown_ticks: 2,
                lives: Some(3),
                step_deadline: Some(DeadlinePolicy {
                    base_ticks: 20,
                    decrease_per_level: 1,
                    min_ticks: 10,
                }),
                reveal_interval_ticks: 1,
                feedback_ticks: 2,
                advance_level_on_success: true,
                scoring: ScoringRules::recall(),
                ..base
            },
            GameKind::WordBlitz => Self {
                session_duration_ticks: Some(60),
                step_deadline: Some(DeadlinePolicy::fixed(5)),
                feedback_ticks: 1,
                scoring: ScoringRules::typing(),
                ..base
            },
            GameKind::NumberNinja => Self {
                countdown_ticks: 5,
                session_duration_ticks: Some(120),
                step_deadline: Some(DeadlinePolicy::fixed(6)),
                feedback_ticks: 1,
                scoring: ScoringRules::arithmetic(),
                ..base
            },
        }
    }

    /// Builder: set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Per-step deadline at a level, if the game has one.
    pub fn deadline_for(&self, level: u32) -> Option<u32> {
        self.step_deadline.map(|policy| policy.ticks_for(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_non_increasing() {
        let policy = DeadlinePolicy {
            base_ticks: 20,
            decrease_per_level: 1,
            min_ticks: 10,
        };
        assert_eq!(policy.ticks_for(1), 19);
        assert_eq!(policy.ticks_for(5), 15);
        assert_eq!(policy.ticks_for(30), 10);

        let mut prev = u32::MAX;
        for level in 1..50 {
            let ticks = policy.ticks_for(level);
            assert!(ticks <= prev);
            assert!(ticks >= 1);
            prev = ticks;
        }
    }

    #[test]
    fn test_deadline_floor_is_one_tick() {
        let policy = DeadlinePolicy {
            base_ticks: 3,
            decrease_per_level: 2,
            min_ticks: 0,
        };
        assert_eq!(policy.ticks_for(10), 1);
    }

    #[test]
    fn test_preset_countdowns_are_two_to_five_ticks() {
        for kind in GameKind::ALL {
            let countdown = SessionConfig::for_game(kind).countdown_ticks;
            assert!((2..=5).contains(&countdown), "{kind}: {countdown}");
        }
    }

    #[test]
    fn test_presets() {
        let clicker = SessionConfig::for_game(GameKind::SpeedClicker);
        assert_eq!(clicker.session_duration_ticks, Some(10));
        assert_eq!(clicker.feedback_ticks, 0);
        assert!(clicker.step_deadline.is_none());

        let recall = SessionConfig::for_game(GameKind::MemoryChain);
        assert_eq!(recall.lives, Some(3));
        assert!(recall.advance_level_on_success);

        let sprint = SessionConfig::default();
        assert_eq!(sprint.kind, GameKind::NumberNinja);
        assert_eq!(sprint.deadline_for(4), Some(6));
        assert!((2..=5).contains(&sprint.countdown_ticks));
    }

    #[test]
    fn test_kind_serde_slug() {
        let json = serde_json::to_string(&GameKind::WordBlitz).unwrap();
        assert_eq!(json, "\"word-blitz\"");
        assert_eq!(GameKind::MemoryChain.to_string(), "memory-chain");
    }
}
