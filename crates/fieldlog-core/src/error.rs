//! Core error types for fieldlog-core.
//!
//! Failures in the timer subsystem are supplementary, not critical: they
//! are logged and contained rather than surfaced to the user. The one
//! exception is [`CoreError::NothingToSave`], which callers are expected
//! to show as a confirmation-style rejection.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fieldlog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification-related errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Saving a session that has no elapsed time is rejected.
    #[error("nothing to save: the timer has no elapsed time")]
    NothingToSave,

    /// Saving requires an armed timer session.
    #[error("no timer session to save")]
    NoSession,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The persistence medium cannot be used at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Notification-bridge errors. Every one of these downgrades the bridge
/// to a no-op; none of them propagate past it.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The platform has no notification capability
    #[error("Notifications unsupported on this platform")]
    Unsupported,

    /// The user denied notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The background host is gone
    #[error("Notification host channel closed")]
    ChannelClosed,

    /// The platform notification call failed
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
