//! Core types for the events crate.

use std::str::FromStr;

use custom_cf_core::Error;
use serde::{Deserialize, Serialize};

/// Stack lifecycle operation carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// The resource was added to the stack.
    Create,
    /// The resource's properties changed.
    Update,
    /// The resource was removed from the stack, or a create is rolling back.
    Delete,
}

impl Operation {
    /// Wire spelling of the operation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(Error::unknown_request_type(other)),
        }
    }
}

/// Identifiers of the stack operation that triggered a request.
///
/// Echoed back on every status envelope and used to build the stack tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackContext {
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
}

impl StackContext {
    /// Create a new stack context.
    pub fn new(
        stack_id: impl Into<String>,
        request_id: impl Into<String>,
        logical_resource_id: impl Into<String>,
    ) -> Self {
        Self {
            stack_id: stack_id.into(),
            request_id: request_id.into(),
            logical_resource_id: logical_resource_id.into(),
        }
    }

    /// Stack name embedded in the stack id.
    ///
    /// Stack ids look like `arn:aws:cloudformation:<region>:<account>:stack/<name>/<uuid>`,
    /// so the name is the second `/`-separated segment.
    pub fn stack_name(&self) -> Option<&str> {
        self.stack_id.split('/').nth(1).filter(|name| !name.is_empty())
    }
}
