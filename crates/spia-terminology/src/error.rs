//! Error types for terminology server interaction.

use thiserror::Error;

/// Errors that can occur while talking to a terminology server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TerminologyError {
    /// Failed to build the HTTP client.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Network request failed or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("terminology server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Failed to parse JSON response.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The response was JSON but not shaped as expected.
    #[error("malformed terminology response: {0}")]
    MalformedResponse(String),

    /// The batch response did not contain one entry per request entry.
    #[error("batch response has {returned} entries, expected {requested}")]
    LengthMismatch {
        /// Number of entries sent.
        requested: usize,
        /// Number of entries received.
        returned: usize,
    },

    /// Every retry attempt failed.
    #[error("terminology request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The final error.
        last: Box<TerminologyError>,
    },
}

impl TerminologyError {
    /// Returns whether this error is potentially recoverable with a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TerminologyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TerminologyError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

/// Result type alias for terminology operations.
pub type Result<T> = std::result::Result<T, TerminologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(TerminologyError::Network("timeout".to_string()).is_retryable());
        assert!(
            TerminologyError::Status {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !TerminologyError::Status {
                status: 400,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !TerminologyError::LengthMismatch {
                requested: 3,
                returned: 2
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_exhausted_message_includes_last_error() {
        let err = TerminologyError::RetriesExhausted {
            attempts: 3,
            last: Box::new(TerminologyError::Network("connection refused".to_string())),
        };
        let message = err.to_string();
        assert!(message.contains("3 attempts"));
        assert!(message.contains("connection refused"));
    }
}
