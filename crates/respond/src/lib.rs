//! # custom-cf-respond
//!
//! Delivery channel for custom resource status envelopes.
//!
//! The orchestrator waits on a single-use pre-signed URL for the outcome of
//! every lifecycle operation. This crate serializes the outcome into a
//! [`ResponseEnvelope`] and PUTs it with a bounded number of immediate
//! retries.
//!
//! ## Example
//!
//! ```ignore
//! use custom_cf_respond::{ResponseClient, ResponseEnvelope};
//!
//! let client = ResponseClient::new()?;
//! let envelope = ResponseEnvelope::failed(&request.context(), "NotAvailable", "no Domain specified");
//! client.deliver(&request.response_url, &envelope).await?;
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;

pub use client::ResponseClient;
pub use config::DeliveryConfig;
pub use envelope::{ResponseEnvelope, Status};
pub use error::{Error, Result};
