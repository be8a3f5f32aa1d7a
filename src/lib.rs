#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # custom-cf
//!
//! CloudFormation custom resource providers for Cognito user pools, identity
//! pools and resource tags.
//!
//! This library re-exports the workspace crates for convenience and hosts the
//! operator commands of the `custom-cf` binary.

pub use custom_cf_core;
pub use custom_cf_events;
pub use custom_cf_reconciler;
pub use custom_cf_resources;
pub use custom_cf_respond;

pub mod cli;
pub mod commands;
