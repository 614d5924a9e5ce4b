//! Error types for the draft_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for draft_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error (e.g. boot requested with nothing to boot from)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid draft mutation (out-of-range exercise or set reference)
    #[error("Draft error: {0}")]
    Draft(String),

    /// Bootstrap payload error
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
