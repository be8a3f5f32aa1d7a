//! Tag reconciliation.
//!
//! Tag kinds own no backend object: they attach a set of tags to an existing
//! target. Updates remove the keys that left the template before writing the
//! full desired set, so the target converges on exactly the declared tags.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use custom_cf_core::Error as InputError;
use custom_cf_events::{Event, Operation, StackContext};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{BackendResult, Properties};
use crate::error::{Error, Result};
use crate::types::{Reconcile, ReconcileAction, Reconciled};

/// Tag key carrying the owning stack's id.
pub const STACK_ID_TAG: &str = "cloudformation:stack-id";
/// Tag key carrying the owning stack's name.
pub const STACK_NAME_TAG: &str = "cloudformation:stack-name";

/// A single key/value tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    /// Create a new tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Properties of a tag kind.
pub trait TaggedResource: Properties {
    /// What the tags are attached to, a role name or an ARN.
    fn target(&self) -> &str;

    /// Declared tags.
    fn tags(&self) -> &[Tag];

    /// Declared tag keys, in declaration order.
    fn keys(&self) -> Vec<String> {
        self.tags().iter().map(|t| t.key.clone()).collect_vec()
    }
}

/// Tagging calls of a backend.
#[async_trait]
pub trait TagBackend: Send + Sync {
    /// Add or overwrite `tags` on `target`.
    async fn tag(&self, target: &str, tags: &[Tag]) -> BackendResult<()>;

    /// Remove `keys` from `target`. Unknown keys are ignored.
    async fn untag(&self, target: &str, keys: &[String]) -> BackendResult<()>;
}

/// Tags identifying the owning stack.
pub fn stack_tags(stack: &StackContext) -> Vec<Tag> {
    let mut tags = vec![Tag::new(STACK_ID_TAG, &stack.stack_id)];
    if let Some(name) = stack.stack_name() {
        tags.push(Tag::new(STACK_NAME_TAG, name));
    }
    tags
}

/// Keys present in `prior` but gone from `desired`, sorted and unique.
pub fn stale_keys(prior: &[Tag], desired: &[Tag]) -> Vec<String> {
    let keep: BTreeSet<&str> = desired.iter().map(|t| t.key.as_str()).collect();
    prior
        .iter()
        .map(|t| t.key.as_str())
        .filter(|key| !keep.contains(key))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect_vec()
}

/// Reconciler for tag kinds.
pub struct TagReconciler<T, B> {
    backend: Arc<B>,
    inject_stack_tags: bool,
    _resource: PhantomData<fn() -> T>,
}

impl<T, B> TagReconciler<T, B>
where
    T: TaggedResource,
    B: TagBackend,
{
    /// Create a reconciler that also writes the stack tags.
    pub const fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inject_stack_tags: true,
            _resource: PhantomData,
        }
    }

    /// Only write the declared tags.
    #[must_use]
    pub const fn without_stack_tags(mut self) -> Self {
        self.inject_stack_tags = false;
        self
    }

    fn full_set(&self, resource: &T, stack: &StackContext) -> Vec<Tag> {
        let mut tags = resource.tags().to_vec();
        if self.inject_stack_tags {
            tags.extend(stack_tags(stack));
        }
        tags
    }

    async fn write(&self, resource: &T, stack: &StackContext) -> Result<()> {
        let tags = self.full_set(resource, stack);
        if tags.is_empty() {
            debug!("No tags to write");
            return Ok(());
        }
        self.backend
            .tag(resource.target(), &tags)
            .await
            .map_err(|e| Error::backend("tag", e))
    }

    async fn remove(&self, target: &str, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.backend
            .untag(target, keys)
            .await
            .map_err(|e| Error::backend("untag", e))
    }
}

#[async_trait]
impl<T, B> Reconcile for TagReconciler<T, B>
where
    T: TaggedResource + DeserializeOwned + Default,
    B: TagBackend,
{
    type Spec = T;

    async fn reconcile(&self, event: &Event<T>) -> Result<Reconciled> {
        let resource = &event.desired;

        if let Some(field) = resource.missing_identity() {
            if event.is_delete() {
                info!(field, "Nothing to untag without identity");
                return Ok(Reconciled::noop());
            }
            return Err(InputError::missing_field(field).into());
        }
        if !event.is_delete() {
            resource.validate()?;
        }

        info!(
            tag_target = resource.target(),
            tags = resource.tags().len(),
            operation = %event.operation,
            "Reconciling tags"
        );

        match event.operation {
            Operation::Create => {
                self.write(resource, &event.stack).await?;
                Ok(Reconciled::bare(ReconcileAction::Create))
            }
            Operation::Update => {
                // A moved target gets a delete of its own for the old one.
                let stale = event
                    .prior
                    .as_ref()
                    .filter(|prior| prior.target() == resource.target())
                    .map(|prior| stale_keys(prior.tags(), resource.tags()))
                    .unwrap_or_default();
                debug!(stale = ?stale, "Removing stale tags");

                self.remove(resource.target(), &stale).await?;
                self.write(resource, &event.stack).await?;
                Ok(Reconciled::bare(ReconcileAction::Update))
            }
            Operation::Delete => {
                let mut keys = resource.keys();
                if self.inject_stack_tags {
                    keys.extend([STACK_ID_TAG.to_string(), STACK_NAME_TAG.to_string()]);
                }
                self.remove(resource.target(), &keys).await?;
                Ok(Reconciled::bare(ReconcileAction::Delete))
            }
        }
    }
}
