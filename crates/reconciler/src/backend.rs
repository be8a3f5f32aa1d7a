//! Resource Backend interface.
//!
//! The management API calls for each resource kind live outside this crate.
//! An adapter implements the traits below and classifies its failures into
//! [`BackendError`] so the engine never has to inspect error text.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Output attributes readable with `Fn::GetAtt`.
pub type Attributes = BTreeMap<String, String>;

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The named resource does not exist.
    #[error("{name} not found")]
    NotFound { name: String },

    /// Transport, permission or service failure.
    #[error("{operation}: {reason}")]
    CallFailed { operation: String, reason: String },
}

impl BackendError {
    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a call failed error.
    pub fn call_failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CallFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether the call failed because the resource is absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Typed properties of one resource kind.
pub trait Properties: Send + Sync {
    /// The `ResourceType` tag this kind answers to.
    const RESOURCE_TYPE: &'static str;

    /// Fields that must be non-empty before any backend call, in report order.
    fn identity_fields(&self) -> Vec<(&'static str, &str)>;

    /// Deterministic physical id reported to the orchestrator.
    fn physical_id(&self) -> String;

    /// Field checks beyond the identity, run on create and update only.
    fn validate(&self) -> custom_cf_core::Result<()> {
        Ok(())
    }

    /// First identity field that is empty.
    fn missing_identity(&self) -> Option<&'static str> {
        self.identity_fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
    }
}

/// A resource kind with a live object in the backend.
pub trait Resource: Properties {
    /// What the backend reports for a live resource.
    type Snapshot: Clone + std::fmt::Debug + Send + Sync;

    /// Natural name used for lookup.
    fn name(&self) -> &str;

    /// Attributes reported after a successful create or update.
    fn attributes(&self, _snapshot: &Self::Snapshot) -> Attributes {
        Attributes::new()
    }

    /// Whether the live resource cannot be changed into `self` in place.
    fn requires_replacement(&self, _current: &Self::Snapshot) -> bool {
        false
    }

    /// Reason the live resource must not be managed by this event.
    fn conflict(&self, _current: &Self::Snapshot) -> Option<String> {
        None
    }
}

/// Lifecycle calls for a resource kind.
#[async_trait]
pub trait ResourceBackend<R: Resource>: Send + Sync {
    /// Look the resource up by name. Absence is [`BackendError::NotFound`].
    async fn describe(&self, resource: &R) -> BackendResult<R::Snapshot>;

    /// Create the resource.
    async fn create(&self, resource: &R) -> BackendResult<R::Snapshot>;

    /// Bring the live resource in line with `resource`.
    async fn update(&self, resource: &R, current: &R::Snapshot) -> BackendResult<R::Snapshot>;

    /// Delete the live resource.
    async fn delete(&self, resource: &R, current: &R::Snapshot) -> BackendResult<()>;
}

/// Calls for kinds that configure a parent object instead of owning one.
#[async_trait]
pub trait SettingsBackend<R: Resource>: Send + Sync {
    /// Write the desired settings.
    async fn apply(&self, resource: &R) -> BackendResult<R::Snapshot>;

    /// Restore the parent's defaults.
    async fn reset(&self, resource: &R) -> BackendResult<()>;
}
