//! Custom resource request envelopes and typed lifecycle events.
//!
//! The orchestrator invokes a provider with one JSON [`Request`] per stack
//! operation. This crate parses that envelope and turns it into an immutable
//! [`Event`] whose desired and prior states are typed per resource kind:
//!
//! - **Request**: the raw wire envelope, tolerant of missing fields so a
//!   `FAILED` status can always be reported back
//! - **Operation**: the closed `Create | Update | Delete` set
//! - **Event**: operation, desired state, prior state (updates only) and the
//!   stack correlation context
//!
//! # Example
//!
//! ```ignore
//! use custom_cf_events::{Event, Request};
//!
//! let request: Request = serde_json::from_str(payload)?;
//! let event: Event<DomainProperties> = request.event("Custom::CognitoUserPoolDomain")?;
//! ```

pub mod event;
pub mod request;
pub mod types;

pub use event::Event;
pub use request::Request;
pub use types::{Operation, StackContext};
