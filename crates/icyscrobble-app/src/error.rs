//! Error types for icyscrobble app services
//!
//! Application-level errors that wrap engine errors and add app-specific variants.

use icyscrobble::error::IcyError;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] IcyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Listen rejected with HTTP {status}: {body}")]
    Submission { status: u16, body: String },
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Engine(IcyError::Network(e))
    }
}

/// Result type alias for icyscrobble app services
pub type Result<T> = std::result::Result<T, AppError>;
