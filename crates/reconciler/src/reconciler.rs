//! Reconciliation engine.
//!
//! One invocation observes the live resource, decides an action with the
//! pure [`plan`] function and then applies it. Absence is a normal state,
//! never an error: deleting something that is gone succeeds, updating
//! something that is gone creates it.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use custom_cf_core::Error as InputError;
use custom_cf_events::{Event, Operation};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::backend::{Resource, ResourceBackend};
use crate::error::{Error, Result};
use crate::types::{Reconcile, ReconcileAction, Reconciled};

/// Decision of the engine for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    NoOp,
    Create,
    Adopt,
    Update,
    Replace,
    Delete,
}

impl Plan {
    /// The action reported for this plan.
    pub const fn action(self) -> ReconcileAction {
        match self {
            Self::NoOp => ReconcileAction::NoOp,
            Self::Create => ReconcileAction::Create,
            Self::Adopt => ReconcileAction::Adopt,
            Self::Update => ReconcileAction::Update,
            Self::Replace => ReconcileAction::Replace,
            Self::Delete => ReconcileAction::Delete,
        }
    }
}

/// Decide what to do about `desired` given the live resource.
///
/// A live resource that conflicts with the event, or that needs replacing to
/// match it, belongs to someone else on delete and is left alone.
pub fn plan<R: Resource>(
    operation: Operation,
    desired: &R,
    current: Option<&R::Snapshot>,
) -> Result<Plan> {
    let Some(current) = current else {
        return Ok(match operation {
            Operation::Delete => Plan::NoOp,
            Operation::Create | Operation::Update => Plan::Create,
        });
    };

    if let Some(reason) = desired.conflict(current) {
        return match operation {
            Operation::Delete => {
                warn!(reason = %reason, "Live resource is not ours, leaving it");
                Ok(Plan::NoOp)
            }
            Operation::Create | Operation::Update => Err(Error::conflict(reason)),
        };
    }

    let replace = desired.requires_replacement(current);
    Ok(match (operation, replace) {
        (Operation::Delete, true) => {
            warn!(
                name = desired.name(),
                "Live resource no longer matches these properties, leaving it"
            );
            Plan::NoOp
        }
        (Operation::Delete, false) => Plan::Delete,
        (Operation::Create | Operation::Update, true) => Plan::Replace,
        (Operation::Create, false) => Plan::Adopt,
        (Operation::Update, false) => Plan::Update,
    })
}

/// Engine for kinds with a live object in the backend.
pub struct Reconciler<R, B> {
    backend: Arc<B>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, B> Reconciler<R, B>
where
    R: Resource,
    B: ResourceBackend<R>,
{
    /// Create a new reconciler.
    pub const fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            _resource: PhantomData,
        }
    }

    /// Get the backend.
    pub const fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Current state of the resource, `None` when absent.
    pub async fn observe(&self, resource: &R) -> Result<Option<R::Snapshot>> {
        match self.backend.describe(resource).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(Error::backend("describe", e)),
        }
    }

    /// Execute a plan.
    pub async fn apply(
        &self,
        plan: Plan,
        resource: &R,
        current: Option<R::Snapshot>,
    ) -> Result<Reconciled> {
        let action = plan.action();
        debug!(action = %action, "Applying plan");

        match (plan, current) {
            (Plan::NoOp, _) | (Plan::Delete, None) => Ok(Reconciled::bare(action)),
            (Plan::Create, _) | (Plan::Adopt | Plan::Update | Plan::Replace, None) => {
                self.create(resource, action).await
            }
            (Plan::Adopt | Plan::Update, Some(current)) => {
                self.update(resource, &current, action).await
            }
            (Plan::Replace, Some(current)) => {
                self.delete(resource, &current).await?;
                self.create(resource, action).await
            }
            (Plan::Delete, Some(current)) => {
                self.delete(resource, &current).await?;
                Ok(Reconciled::bare(action))
            }
        }
    }

    async fn create(&self, resource: &R, action: ReconcileAction) -> Result<Reconciled> {
        let snapshot = self
            .backend
            .create(resource)
            .await
            .map_err(|e| Error::backend("create", e))?;
        Ok(Reconciled::new(action, resource.attributes(&snapshot)))
    }

    async fn update(
        &self,
        resource: &R,
        current: &R::Snapshot,
        action: ReconcileAction,
    ) -> Result<Reconciled> {
        match self.backend.update(resource, current).await {
            Ok(snapshot) => Ok(Reconciled::new(action, resource.attributes(&snapshot))),
            Err(e) if e.is_not_found() => {
                info!("Resource vanished before update, creating it");
                self.create(resource, action).await
            }
            Err(e) => Err(Error::backend("update", e)),
        }
    }

    async fn delete(&self, resource: &R, current: &R::Snapshot) -> Result<()> {
        match self.backend.delete(resource, current).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Resource already gone");
                Ok(())
            }
            Err(e) => Err(Error::backend("delete", e)),
        }
    }
}

#[async_trait]
impl<R, B> Reconcile for Reconciler<R, B>
where
    R: Resource + DeserializeOwned + Default,
    B: ResourceBackend<R>,
{
    type Spec = R;

    async fn reconcile(&self, event: &Event<R>) -> Result<Reconciled> {
        let resource = &event.desired;

        if let Some(field) = resource.missing_identity() {
            if event.is_delete() {
                info!(field, "Nothing to delete without identity");
                return Ok(Reconciled::noop());
            }
            return Err(InputError::missing_field(field).into());
        }
        if !event.is_delete() {
            resource.validate()?;
        }

        let current = self.observe(resource).await?;
        let decided = plan(event.operation, resource, current.as_ref())?;
        info!(
            name = resource.name(),
            exists = current.is_some(),
            action = %decided.action(),
            "Reconciling"
        );

        self.apply(decided, resource, current).await
    }
}
