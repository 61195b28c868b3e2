//! Core error types for rollcall-core.
//!
//! Each concern gets its own thiserror enum; [`CoreError`] wraps them for
//! callers that only want a single error type.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ChannelId;

/// Core error type for rollcall-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Command argument errors, reported back to the actor.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Durable store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Check-in window errors
    #[error("Check-in error: {0}")]
    Checkin(#[from] CheckinError),

    /// The platform collaborator failed to deliver a message
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Problems with an administrative command's arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// add/remove issued without naming a user
    #[error("Please mention a user to {action}.")]
    MissingUser { action: &'static str },
}

/// Errors reading or writing the attendance document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed attendance document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Used by non-file stores
    #[error("Store unavailable: {0}")]
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not locate or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Check-in window state machine violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckinError {
    /// A daily trigger fired while the previous window is still collecting.
    #[error("Check-in window for {day} is still open until {closes_at}")]
    WindowAlreadyOpen {
        day: chrono::NaiveDate,
        closes_at: chrono::DateTime<chrono::Utc>,
    },
}

/// The collaborator could not post to or resolve a channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Channel {0} not found")]
    ChannelNotFound(ChannelId),

    #[error("Failed to post to channel {channel}: {message}")]
    PostFailed { channel: ChannelId, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
