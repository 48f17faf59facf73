//! Input Logs and Replay
//!
//! A session is a pure function of its configuration (seed included) and
//! the ordered stream of operations applied to it. [`Recorder`] captures
//! that stream into an [`InputLog`]; [`replay_session`] re-applies it to a
//! fresh session and checks the final state hash.

use serde::{Serialize, Deserialize};

use crate::core::StateHash;
use crate::error::EngineError;
use super::challenge::{PlayerInput, Verdict};
use super::config::SessionConfig;
use super::session::{Session, TickResult};

/// Current log format version.
pub const INPUT_LOG_VERSION: u8 = 1;

/// One recorded operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    /// `start()`
    Start,
    /// `tick()`
    Tick,
    /// `submit_input(..)`
    Input(PlayerInput),
    /// `finish()`
    Finish,
    /// `reset()`
    Reset,
}

/// Everything needed to reproduce a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLog {
    /// Format version.
    pub version: u8,
    /// Session configuration, seed included.
    pub config: SessionConfig,
    /// Operations in order.
    pub entries: Vec<LogEntry>,
    /// State hash after the last entry, once sealed.
    pub final_hash: Option<StateHash>,
}

impl InputLog {
    /// Create an empty log.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            version: INPUT_LOG_VERSION,
            config,
            entries: Vec::new(),
            final_hash: None,
        }
    }

    /// Number of recorded ticks.
    pub fn tick_count(&self) -> usize {
        self.entries.iter().filter(|e| **e == LogEntry::Tick).count()
    }

    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        bincode::serialize(self).map_err(|e| ReplayError::Encode(e.to_string()))
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ReplayError> {
        let log: Self =
            bincode::deserialize(data).map_err(|e| ReplayError::Decode(e.to_string()))?;
        if log.version != INPUT_LOG_VERSION {
            return Err(ReplayError::VersionMismatch {
                expected: INPUT_LOG_VERSION,
                got: log.version,
            });
        }
        Ok(log)
    }
}

/// Apply one logged operation to a session.
pub fn apply_entry(session: &mut Session, entry: &LogEntry) -> Result<(), EngineError> {
    match entry {
        LogEntry::Start => session.start(),
        LogEntry::Tick => {
            session.tick();
            Ok(())
        }
        LogEntry::Input(input) => {
            session.submit_input(input.clone());
            Ok(())
        }
        LogEntry::Finish => session.finish(),
        LogEntry::Reset => {
            session.reset();
            Ok(())
        }
    }
}

/// Replay a log against a fresh session.
///
/// Fails if an operation is rejected or the final hash differs from the
/// sealed one.
pub fn replay_session(log: &InputLog) -> Result<Session, ReplayError> {
    let mut session = Session::new(log.config.clone());
    for entry in &log.entries {
        apply_entry(&mut session, entry)?;
    }

    if let Some(expected) = log.final_hash {
        let actual = session.compute_hash();
        if actual != expected {
            return Err(ReplayError::HashMismatch {
                expected: hex::encode(expected),
                actual: hex::encode(actual),
            });
        }
    }
    Ok(session)
}

/// A session that records every accepted operation.
#[derive(Clone, Debug)]
pub struct Recorder {
    session: Session,
    log: InputLog,
}

impl Recorder {
    /// Create a recorder around a fresh session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: Session::new(config.clone()),
            log: InputLog::new(config),
        }
    }

    /// The recorded session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access for draining events.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Start and record.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.session.start()?;
        self.log.entries.push(LogEntry::Start);
        Ok(())
    }

    /// Submit and record. Inputs the session ignores are not recorded.
    pub fn submit_input(&mut self, input: PlayerInput) -> Option<Verdict> {
        let verdict = self.session.submit_input(input.clone());
        if verdict.is_some() {
            self.log.entries.push(LogEntry::Input(input));
        }
        verdict
    }

    /// Tick and record.
    pub fn tick(&mut self) -> TickResult {
        self.log.entries.push(LogEntry::Tick);
        self.session.tick()
    }

    /// Finish and record.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.session.finish()?;
        self.log.entries.push(LogEntry::Finish);
        Ok(())
    }

    /// Reset and record.
    pub fn reset(&mut self) {
        self.session.reset();
        self.log.entries.push(LogEntry::Reset);
    }

    /// Seal the log with the current state hash and hand it over.
    pub fn into_log(self) -> InputLog {
        let mut log = self.log;
        log.final_hash = Some(self.session.compute_hash());
        log
    }
}

/// Replay and log errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Serialization failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Deserialization failed.
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// Unsupported log version.
    #[error("Version mismatch: expected {expected}, got {got}")]
    VersionMismatch {
        /// Supported version.
        expected: u8,
        /// Version in the log.
        got: u8,
    },

    /// A logged operation was rejected.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Replay diverged.
    #[error("State hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        /// Sealed hash (hex).
        expected: String,
        /// Replayed hash (hex).
        actual: String,
    },
}
