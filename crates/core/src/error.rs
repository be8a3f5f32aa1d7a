//! Input errors for custom resource requests.
//!
//! None of these are retryable: the same request would fail the same way, so
//! they are reported straight back to the orchestrator as `FAILED`.

use thiserror::Error;

/// Core error type for request and property handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("wrong ResourceType in request: expected {expected} but got {actual}")]
    WrongResourceType { expected: String, actual: String },

    #[error("unknown RequestType '{request_type}': expected Create, Update or Delete")]
    UnknownRequestType { request_type: String },

    #[error("couldn't parse {field}: {reason}")]
    PropertiesParseFailed { field: &'static str, reason: String },

    #[error("no {field} specified")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl Error {
    /// Create a wrong resource type error.
    pub fn wrong_resource_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::WrongResourceType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unknown request type error.
    pub fn unknown_request_type(request_type: impl Into<String>) -> Self {
        Self::UnknownRequestType {
            request_type: request_type.into(),
        }
    }

    /// Create a properties parse error.
    pub fn properties_parse_failed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::PropertiesParseFailed {
            field,
            reason: reason.into(),
        }
    }

    /// Create a missing field error.
    pub const fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
