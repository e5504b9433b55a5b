//! Error types for Duskblade.

use thiserror::Error;

/// Top-level error type for Duskblade operations.
#[derive(Debug, Error)]
pub enum DuskbladeError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config could not be written
    #[error("Failed to encode config: {0}")]
    Encode(String),
}

/// Result type alias for Duskblade operations.
pub type DuskbladeResult<T> = Result<T, DuskbladeError>;
