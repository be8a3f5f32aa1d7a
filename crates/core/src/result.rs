//! Result type definition and extension traits.
//!
//! Input errors that a caller may skip past are logged, never silently dropped.

use crate::error::Error;

/// The standard Result type for input handling.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for core Results.
pub trait ResultExt<T> {
    /// Convert a Result to an Option, logging the error if present.
    fn into_option_logged(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn into_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding input error");
                None
            }
        }
    }
}
