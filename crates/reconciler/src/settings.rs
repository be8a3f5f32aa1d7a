//! Settings reconciliation.
//!
//! Some kinds have no existence of their own: they write configuration onto a
//! parent object (a user pool's MFA mode, a client's hosted UI stylesheet, an
//! identity pool's roles). Create and update both apply the desired settings
//! and delete restores the parent's defaults.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use custom_cf_core::Error as InputError;
use custom_cf_events::Event;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::backend::{Resource, SettingsBackend};
use crate::error::{Error, Result};
use crate::types::{Reconcile, ReconcileAction, Reconciled};

/// Reconciler for settings kinds.
pub struct SettingsReconciler<R, B> {
    backend: Arc<B>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, B> SettingsReconciler<R, B>
where
    R: Resource,
    B: SettingsBackend<R>,
{
    /// Create a new settings reconciler.
    pub const fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R, B> Reconcile for SettingsReconciler<R, B>
where
    R: Resource + DeserializeOwned + Default,
    B: SettingsBackend<R>,
{
    type Spec = R;

    async fn reconcile(&self, event: &Event<R>) -> Result<Reconciled> {
        let resource = &event.desired;

        if let Some(field) = resource.missing_identity() {
            if event.is_delete() {
                info!(field, "Nothing to reset without identity");
                return Ok(Reconciled::noop());
            }
            return Err(InputError::missing_field(field).into());
        }

        if event.is_delete() {
            info!(name = resource.name(), "Resetting settings");
            self.backend
                .reset(resource)
                .await
                .map_err(|e| Error::backend("reset", e))?;
            return Ok(Reconciled::bare(ReconcileAction::Reset));
        }

        resource.validate()?;
        info!(name = resource.name(), "Applying settings");
        let snapshot = self
            .backend
            .apply(resource)
            .await
            .map_err(|e| Error::backend("apply", e))?;
        Ok(Reconciled::new(
            ReconcileAction::Apply,
            resource.attributes(&snapshot),
        ))
    }
}
