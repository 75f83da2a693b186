//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid listen address: {0}")]
    InvalidListenAddress(String),

    #[error("Invalid request timeout (must be 1-300 seconds)")]
    InvalidTimeout,

    #[error("Request timeout ({request_secs}s) must exceed the spreadsheet timeout ({save_secs}s)")]
    RequestTimeoutTooShort { request_secs: u64, save_secs: u64 },

    #[error("Invalid spreadsheet timeout (must be 1-120 seconds)")]
    InvalidSheetsTimeout,

    #[error("Invalid spreadsheet API base URL")]
    InvalidApiBaseUrl,

    #[error("Fallback log path must not be empty")]
    EmptyFallbackPath,

    #[error("Session TTL must be 1-604800 seconds")]
    InvalidSessionTtl,

    #[error("Sweep interval must be 1-86400 seconds")]
    InvalidSweepInterval,
}
