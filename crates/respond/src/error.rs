//! Error types for status delivery.

use thiserror::Error;

/// Result type for delivery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while delivering a status envelope.
#[derive(Error, Debug)]
pub enum Error {
    /// The request carried no response URL.
    #[error("pre-signed response URL can't be empty")]
    EmptyEndpoint,

    /// The serialized envelope was empty.
    #[error("body of response can't be empty")]
    EmptyBody,

    /// The response URL could not be parsed.
    #[error("invalid response URL: {reason}")]
    InvalidEndpoint { reason: String },

    /// The PUT never got an HTTP response.
    #[error("couldn't send request for response URL (attempt {attempt}): {reason}")]
    Transport { attempt: u32, reason: String },

    /// The PUT got a response other than 200.
    #[error("response URL answered with status {status}, expected 200 (attempt {attempt})")]
    UnexpectedStatus { status: u16, attempt: u32 },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            reason: reason.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(attempt: u32, reason: impl Into<String>) -> Self {
        Self::Transport {
            attempt,
            reason: reason.into(),
        }
    }

    /// Create an unexpected status error.
    pub const fn unexpected_status(status: u16, attempt: u32) -> Self {
        Self::UnexpectedStatus { status, attempt }
    }

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Check if another attempt could succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::UnexpectedStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(Error::transport(1, "connection refused").is_retryable());
        assert!(Error::unexpected_status(500, 2).is_retryable());
    }

    #[test]
    fn test_precondition_errors_not_retryable() {
        assert!(!Error::EmptyEndpoint.is_retryable());
        assert!(!Error::EmptyBody.is_retryable());
        assert!(!Error::invalid_endpoint("relative URL without a base").is_retryable());
        assert!(!Error::config_error("bad config").is_retryable());
    }

    #[test]
    fn test_unexpected_status_display() {
        let err = Error::unexpected_status(403, 5);
        assert_eq!(
            err.to_string(),
            "response URL answered with status 403, expected 200 (attempt 5)"
        );
    }
}
