//! Error types shared by the waveframe crates.

use thiserror::Error;

/// Main error type for configuration and application plumbing.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values that parse but make no sense
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;
