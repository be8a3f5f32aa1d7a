//! Reconciliation engine for custom resource providers.
//!
//! Each invocation converges one backend resource on the state declared in
//! the template:
//!
//! - **Observe**: look the resource up by name, absence is `None`
//! - **Plan**: decide from the operation and the live state, see [`plan`]
//! - **Apply**: run the mutating calls, treating absence as already done
//! - **Report**: fold the result into an [`Outcome`] and deliver it
//!
//! # Strategies
//!
//! - [`Reconciler`] for kinds that own a backend object
//! - [`TagReconciler`] for kinds that attach tags to an existing target
//! - [`SettingsReconciler`] for kinds that configure a parent object
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use custom_cf_reconciler::{Handler, HandlerConfig, Reconciler};
//! use custom_cf_respond::ResponseClient;
//!
//! let reconciler = Reconciler::<DomainProperties, _>::new(Arc::new(cognito_domains));
//! let handler = Handler::new("userpool-domain", reconciler, ResponseClient::new()?)
//!     .with_config(HandlerConfig::from_env());
//!
//! handler.handle(&request).await?;
//! ```

pub mod backend;
pub mod error;
pub mod handler;
pub mod memory;
pub mod paginate;
pub mod reconciler;
pub mod settings;
pub mod tags;
pub mod types;

// Re-export main types
pub use backend::{
    Attributes, BackendError, BackendResult, Properties, Resource, ResourceBackend,
    SettingsBackend,
};
pub use error::{Error, Result};
pub use handler::{Handler, HandlerConfig, NOT_AVAILABLE};
pub use memory::{Call, InMemoryBackend, InMemoryTagBackend};
pub use paginate::{Page, PagedListing, find_by_name, list_all, pages};
pub use reconciler::{Plan, Reconciler, plan};
pub use settings::SettingsReconciler;
pub use tags::{Tag, TagBackend, TagReconciler, TaggedResource, stack_tags, stale_keys};
pub use types::{Outcome, Reconcile, ReconcileAction, Reconciled};
