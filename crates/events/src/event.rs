//! Typed lifecycle event.

use crate::types::{Operation, StackContext};

/// One lifecycle trigger for a resource of kind `P`.
///
/// Built once per invocation from a [`crate::Request`] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<P> {
    /// What the orchestrator is doing to the resource.
    pub operation: Operation,
    /// Properties from the template. On delete these are the current properties.
    pub desired: P,
    /// Previous properties, only present on updates.
    pub prior: Option<P>,
    /// Correlation identifiers of the owning stack operation.
    pub stack: StackContext,
}

impl<P> Event<P> {
    /// Create a new event.
    pub const fn new(operation: Operation, desired: P, stack: StackContext) -> Self {
        Self {
            operation,
            desired,
            prior: None,
            stack,
        }
    }

    /// Attach the prior state.
    #[must_use]
    pub fn with_prior(mut self, prior: P) -> Self {
        self.prior = Some(prior);
        self
    }

    /// Whether this event tears the resource down.
    pub fn is_delete(&self) -> bool {
        self.operation == Operation::Delete
    }
}
