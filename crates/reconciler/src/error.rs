//! Error types for the reconciler crate.

use thiserror::Error;

use crate::backend::BackendError;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
///
/// Every variant is fatal to the invocation and ends up as the reason of a
/// `FAILED` status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The request or its properties were rejected.
    #[error(transparent)]
    Input(#[from] custom_cf_core::Error),

    /// A backend call failed.
    #[error("{step} failed: {source}")]
    Backend {
        step: &'static str,
        #[source]
        source: BackendError,
    },

    /// A live resource with the same name is not ours to manage.
    #[error("conflict: {reason}")]
    Conflict { reason: String },
}

impl Error {
    /// Create a backend error for the given step.
    pub const fn backend(step: &'static str, source: BackendError) -> Self {
        Self::Backend { step, source }
    }

    /// Create a conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }
}
