//! Error types for quiz widgets

use thiserror::Error;

/// Result type alias for quiz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or driving a quiz widget
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to set up a controller (e.g. no async runtime available)
    #[error("Quiz initialization failed: {0}")]
    InitializationError(String),

    /// A time literal was neither a number of seconds nor `MM:SS`
    #[error("Invalid time code: {0:?}")]
    InvalidTime(String),

    /// A video id that cannot prefix element ids
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    /// Question input could not be turned into a `Question`
    #[error("Invalid question #{index}: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    /// An element the renderer needed was not present
    #[error("Element not found: #{0}")]
    MissingElement(String),

    /// The external player could not be created or rejected an operation
    #[error("Player error: {0}")]
    PlayerError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
