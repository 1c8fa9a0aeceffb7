//! Error types for the portfolio engine.

use thiserror::Error;

/// Main error type for portfolio operations.
///
/// Only genuine failures (I/O, malformed configuration) surface as errors.
/// Computations that simply have no answer — too few dates, too little
/// overlap — return `None` instead, never an error.
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;
