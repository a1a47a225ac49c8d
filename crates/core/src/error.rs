//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Numeric HTTP-equivalent status attached to this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::Timeout(_) => 504,
            Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => 500,
        }
    }

    /// Message without the kind prefix, suitable for API clients.
    pub fn message(&self) -> String {
        match self {
            Error::Validation(message)
            | Error::Conflict(message)
            | Error::NotFound(message)
            | Error::Timeout(message)
            | Error::Storage(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
