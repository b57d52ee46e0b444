//! Core error types for setwise-core.
//!
//! Every failure in the core is local and recoverable. Timer and progression
//! errors are returned before any state is touched, so a rejected call never
//! leaves a half-applied transition behind.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::SetStatus;
use crate::timer::TimerState;

/// Core error type for setwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer state machine errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Progression evaluation errors
    #[error("Progression error: {0}")]
    Progression(#[from] ProgressionError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lookup of a record that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the interval and rest timers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Operation is not valid in the current state.
    #[error("cannot {op} while {state:?}")]
    InvalidTransition { op: &'static str, state: TimerState },

    /// Missing or non-positive target, or a set that cannot be timed.
    #[error("invalid timer configuration: {0}")]
    InvalidConfiguration(String),

    /// A set is already bound to the timer.
    #[error("timer already active for set {set_id}")]
    AlreadyActive { set_id: String },

    /// A pause interval is already open.
    #[error("already paused")]
    AlreadyPaused,

    /// The set has left the states that allow this change.
    #[error("set {set_id} is {status:?}")]
    SetClosed { set_id: String, status: SetStatus },
}

/// Errors raised by the progression evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    /// The exercise kind supports progression but no increment is configured.
    #[error("no auto-increase configured for {kind} exercise")]
    NotConfigured { kind: &'static str },

    /// The exercise kind has no progression branch.
    #[error("{kind} exercises do not support auto-increase")]
    UnsupportedKind { kind: &'static str },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored document could not be decoded
    #[error("Corrupt record '{id}': {message}")]
    CorruptRecord { id: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
