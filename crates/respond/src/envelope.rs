//! Status envelope written to the response URL.

use std::collections::BTreeMap;

use custom_cf_events::StackContext;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Final status of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Failed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// The JSON document the orchestrator reads back from the response URL.
///
/// Field order is the wire order. `Reason` is only written for failures and
/// `Data` only for successes that produced attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    /// Values readable with `Fn::GetAtt` in the template.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    /// Envelope reporting success with the given attributes.
    pub fn success(
        stack: &StackContext,
        physical_resource_id: impl Into<String>,
        data: BTreeMap<String, String>,
    ) -> Self {
        Self {
            status: Status::Success,
            reason: None,
            physical_resource_id: physical_resource_id.into(),
            stack_id: stack.stack_id.clone(),
            request_id: stack.request_id.clone(),
            logical_resource_id: stack.logical_resource_id.clone(),
            data,
        }
    }

    /// Envelope reporting failure with a human-readable reason.
    pub fn failed(
        stack: &StackContext,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status: Status::Failed,
            reason: Some(reason.into()),
            physical_resource_id: physical_resource_id.into(),
            stack_id: stack.stack_id.clone(),
            request_id: stack.request_id.clone(),
            logical_resource_id: stack.logical_resource_id.clone(),
            data: BTreeMap::new(),
        }
    }

    /// Serialize to the request body.
    pub fn to_body(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> StackContext {
        StackContext::new("stack1", "1234", "resource1")
    }

    #[test]
    fn test_success_body() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = BTreeMap::from([
            ("UserPoolId".to_string(), "eu-west-1_abc".to_string()),
            ("ClientId".to_string(), "client".to_string()),
        ]);
        let body = ResponseEnvelope::success(&stack(), "phys", data).to_body()?;

        assert_eq!(
            body,
            r#"{"Status":"SUCCESS","PhysicalResourceId":"phys","StackId":"stack1","RequestId":"1234","LogicalResourceId":"resource1","Data":{"ClientId":"client","UserPoolId":"eu-west-1_abc"}}"#
        );
        Ok(())
    }

    #[test]
    fn test_success_body_omits_empty_data() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let body = ResponseEnvelope::success(&stack(), "phys", BTreeMap::new()).to_body()?;

        assert_eq!(
            body,
            r#"{"Status":"SUCCESS","PhysicalResourceId":"phys","StackId":"stack1","RequestId":"1234","LogicalResourceId":"resource1"}"#
        );
        Ok(())
    }

    #[test]
    fn test_failed_body() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let body = ResponseEnvelope::failed(&stack(), "NotAvailable", "boom").to_body()?;

        assert_eq!(
            body,
            r#"{"Status":"FAILED","Reason":"boom","PhysicalResourceId":"NotAvailable","StackId":"stack1","RequestId":"1234","LogicalResourceId":"resource1"}"#
        );
        Ok(())
    }

    #[test]
    fn test_body_parses_back() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = BTreeMap::from([("Domain".to_string(), "d123.cloudfront.net".to_string())]);
        let envelope = ResponseEnvelope::success(&stack(), "auth.example.com", data);

        let parsed: ResponseEnvelope = serde_json::from_str(&envelope.to_body()?)?;
        assert_eq!(parsed, envelope);
        Ok(())
    }
}
