//! Setup-time errors.
//!
//! Runtime conditions (invalid input events, invalid claims, stale
//! marker sets, cancellation) are never errors; they are handled locally
//! by the component that detects them. Only configuration loading and
//! validation can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
