//! Engine Configuration
//!
//! Top-level settings for the binary: which game to run, how fast the clock
//! ticks, the tournament to join and the default log filter. Read from a
//! JSON file; every field is optional and falls back to its default.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::{GameKind, SessionConfig};
use crate::tournament::TournamentConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for [`EngineConfig`]
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for a whole run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Game to play
    pub game: GameKind,
    /// Seed for the session and tournament streams
    pub seed: u64,
    /// Clock rate for the driver
    pub ticks_per_second: u32,
    /// Full session override; replaces the preset for `game` when set
    pub session: Option<SessionConfig>,
    /// Tournament used by arena runs
    pub tournament: TournamentConfig,
    /// Name shown on the leaderboard for the real participant
    pub player_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            game: GameKind::NumberNinja,
            seed: 42,
            ticks_per_second: 1,
            session: None,
            tournament: TournamentConfig::default(),
            player_name: "You".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Session settings for this run.
    ///
    /// The override wins when present; otherwise the preset for `game`
    /// with the configured seed and tick rate.
    pub fn session_config(&self) -> SessionConfig {
        match &self.session {
            Some(session) => session.clone(),
            None => {
                let mut session = SessionConfig::for_game(self.game).with_seed(self.seed);
                session.ticks_per_second = self.ticks_per_second;
                session
            }
        }
    }

    /// Tournament settings for this run, seeded from the run seed.
    pub fn tournament_config(&self) -> TournamentConfig {
        TournamentConfig {
            seed: self.seed,
            ..self.tournament.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "game": "memory-chain", "seed": 7, "tournament": { "duration_ticks": 30 } }"#,
        )
        .unwrap();

        assert_eq!(config.game, GameKind::MemoryChain);
        assert_eq!(config.tournament.duration_ticks, 30);
        assert_eq!(config.tournament.max_participants, 12);
        assert_eq!(config.log_filter, "info");

        let session = config.session_config();
        assert_eq!(session.kind, GameKind::MemoryChain);
        assert_eq!(session.seed, 7);
        assert_eq!(session.lives, Some(3));
        assert_eq!(config.tournament_config().seed, 7);
    }

    #[test]
    fn test_session_override_wins() {
        let config = EngineConfig::from_json_str(
            r#"{ "game": "word-blitz", "session": { "kind": "speed-clicker", "countdown_ticks": 1 } }"#,
        )
        .unwrap();

        let session = config.session_config();
        assert_eq!(session.kind, GameKind::SpeedClicker);
        assert_eq!(session.countdown_ticks, 1);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = EngineConfig::from_json_str(r#"{ "game": "chess" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::load("/nonexistent/skill-arena.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("Failed to read config"));
    }
}
