//! Error types

use thiserror::Error;

/// Custom error type
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Advisory backend error
    #[error("Advisory error: {0}")]
    Advisory(String),

    /// A wallet connection is already pending
    #[error("Connection already in progress with {0}")]
    ConnectionInProgress(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Advisory(err.to_string())
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
