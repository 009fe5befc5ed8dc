//! Core error types for timerbuddies-core.
//!
//! Validation failures are reported before any state changes. Store errors
//! surface from explicit save/delete calls only; load-time failures are
//! downgraded to empty collections by the registries.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timerbuddies-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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

/// Validation errors for user intents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Timer or preset duration must be positive
    #[error("Duration must be greater than zero seconds (got {seconds})")]
    NonPositiveDuration { seconds: u64 },

    /// Custom duration fields outside the accepted ranges
    #[error("Invalid duration {minutes}m {seconds}s: minutes must be 0-999, seconds 0-59, total above zero")]
    DurationOutOfRange { minutes: u32, seconds: u32 },

    /// Preset name is empty or whitespace
    #[error("Preset name must not be empty")]
    EmptyName,

    /// No preset with this id
    #[error("No preset with id '{id}'")]
    UnknownPreset { id: String },

    /// Image reference is empty
    #[error("Image reference must not be empty")]
    EmptyImageRef,

    /// Image reference contains the list delimiter
    #[error("Image reference must not contain '{delimiter}'")]
    ImageRefContainsDelimiter { delimiter: &'static str },

    /// Image prompt is blank
    #[error("Please describe what you want to see")]
    EmptyPrompt,

    /// Image prompt contains a blocked keyword
    #[error("Prompt is not kid-friendly (contains '{keyword}')")]
    PromptNotKidFriendly { keyword: String },
}

/// Persistent store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// Failed to resolve or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
