//! Error types for the operator client

use thiserror::Error;

/// Operator client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout, or protocol failure
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with an error envelope
    #[error("API error {status}: {}", .messages.join("; "))]
    Api { status: u16, messages: Vec<String> },

    /// Success body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Session file missing, unreadable, or malformed
    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Interactive prompt failed
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl ClientError {
    /// HTTP status of an API-reported error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
