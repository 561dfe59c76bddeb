//! Error types for niti-api

use thiserror::Error;

/// Result type alias using niti-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Backend returned 401; the session has been invalidated
    #[error("Not authenticated")]
    Unauthorized,
}

impl Error {
    /// Create an API error from a status code and response body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a transport-level failure (network error or 5xx)
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
