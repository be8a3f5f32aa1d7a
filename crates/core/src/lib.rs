//! # custom-cf-core
//!
//! Error taxonomy and result helpers shared by every custom-cf crate.
//!
//! Input errors live here because every layer can raise them: the event
//! envelope rejects a wrong resource type, the reconciler rejects empty
//! identity fields, and each resource kind rejects malformed settings. They
//! all end up as the `Reason` of a `FAILED` status envelope.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::{Result, ResultExt};
