//! Error types for niti-client

use thiserror::Error;

/// Result type alias using niti-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the state layer.
///
/// Nothing here is fatal; every failure is recoverable by user retry.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the HTTP layer
    #[error(transparent)]
    Api(#[from] niti_api::Error),

    /// Local validation failed; no network call was attempted
    #[error("invalid input: {0}")]
    Validation(String),

    /// The server reported terminal processing failure for a document
    #[error("document processing failed: {0}")]
    Processing(String),

    /// Status polling exhausted its attempt budget without a terminal status
    #[error("document processing timed out after {attempts} status checks")]
    PollTimeout { attempts: u32 },
}

impl Error {
    /// Check if this is a transport-level failure (network error or 5xx)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_transport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification_passes_through() {
        let e = Error::Api(niti_api::Error::api(502, "bad gateway"));
        assert!(e.is_transport());
        assert!(!Error::Validation("bad file".into()).is_transport());
        assert!(!Error::PollTimeout { attempts: 60 }.is_transport());
    }

    #[test]
    fn test_poll_timeout_display() {
        let e = Error::PollTimeout { attempts: 60 };
        assert_eq!(
            e.to_string(),
            "document processing timed out after 60 status checks"
        );
    }
}
