//! Core types for the reconciler.

use async_trait::async_trait;
use custom_cf_events::Event;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{Attributes, Properties};
use crate::error::Result;

/// What an invocation did to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileAction {
    /// Nothing to do.
    NoOp,
    /// Create a new resource.
    Create,
    /// Take over a resource created outside the stack and update it.
    Adopt,
    /// Update the live resource in place.
    Update,
    /// Delete the live resource and create it again.
    Replace,
    /// Delete the live resource.
    Delete,
    /// Write settings onto a parent object.
    Apply,
    /// Restore a parent object's default settings.
    Reset,
}

impl ReconcileAction {
    /// Get a description of the action.
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Adopt => "adopt",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Apply => "apply",
            Self::Reset => "reset",
        }
    }

    /// Whether the action changes anything in the backend.
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

impl std::fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Result of reconciling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The action that was taken.
    pub action: ReconcileAction,
    /// Attributes to report on success.
    pub attributes: Attributes,
}

impl Reconciled {
    /// Create a new reconciled result.
    pub const fn new(action: ReconcileAction, attributes: Attributes) -> Self {
        Self { action, attributes }
    }

    /// Result with no attributes.
    pub const fn bare(action: ReconcileAction) -> Self {
        Self::new(action, Attributes::new())
    }

    /// Nothing was done.
    pub const fn noop() -> Self {
        Self::bare(ReconcileAction::NoOp)
    }
}

/// Final outcome handed to the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { attributes: Attributes },
    Failed { reason: String },
}

impl Outcome {
    /// Create a failed outcome.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Check if the operation succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<Reconciled>> for Outcome {
    fn from(result: Result<Reconciled>) -> Self {
        match result {
            Ok(reconciled) => Self::Success {
                attributes: reconciled.attributes,
            },
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// A reconciliation strategy for one resource kind.
///
/// Implemented by the engine and by the tag and settings variants.
#[async_trait]
pub trait Reconcile: Send + Sync {
    /// Properties of the kind this strategy handles.
    type Spec: Properties + DeserializeOwned + Default;

    /// Converge the backend on `event`.
    async fn reconcile(&self, event: &Event<Self::Spec>) -> Result<Reconciled>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_reconcile_action_description() {
        assert_eq!(ReconcileAction::Adopt.to_string(), "adopt");
        assert!(!ReconcileAction::NoOp.is_mutating());
        assert!(ReconcileAction::Reset.is_mutating());
    }

    #[test]
    fn test_outcome_from_success() {
        let attributes = Attributes::from([("Domain".to_string(), "d1.cloudfront.net".to_string())]);
        let outcome = Outcome::from(Ok(Reconciled::new(ReconcileAction::Create, attributes.clone())));
        assert_eq!(outcome, Outcome::Success { attributes });
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = Outcome::from(Err(Error::conflict("owned by another pool")));
        assert_eq!(outcome, Outcome::failed("conflict: owned by another pool"));
        assert!(!outcome.is_success());
    }
}
