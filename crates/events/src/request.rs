//! Wire envelope sent by the orchestrator.

use custom_cf_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::event::Event;
use crate::types::{Operation, StackContext};

/// Request from the orchestrator.
///
/// Every field defaults when absent so that even a malformed request can be
/// answered with a `FAILED` status on its `ResponseURL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Request {
    /// `Create`, `Update` or `Delete`; kept as text so unknown values can be reported.
    pub request_type: String,
    /// Single-use pre-signed upload URL for the status envelope.
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub resource_type: String,
    pub logical_resource_id: String,
    /// Sent on Update and Delete: the id we reported last time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,
}

impl Request {
    /// Parse the request type.
    pub fn operation(&self) -> Result<Operation> {
        self.request_type.parse()
    }

    /// Correlation identifiers for the status envelope.
    pub fn context(&self) -> StackContext {
        StackContext::new(
            self.stack_id.clone(),
            self.request_id.clone(),
            self.logical_resource_id.clone(),
        )
    }

    /// Physical id the orchestrator sent, if any.
    ///
    /// Only updates and deletes carry one; an empty string counts as absent.
    pub fn reported_physical_id(&self) -> Option<&str> {
        self.physical_resource_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Fail unless the request targets `expected`.
    pub fn check_resource_type(&self, expected: &str) -> Result<()> {
        if self.resource_type == expected {
            Ok(())
        } else {
            Err(Error::wrong_resource_type(expected, &self.resource_type))
        }
    }

    /// Parse `ResourceProperties` and, on updates only, `OldResourceProperties`.
    ///
    /// Absent, `null` or empty-string properties parse as `P::default()` so a
    /// delete that follows a failed create still reaches the reconciler.
    pub fn properties<P>(&self) -> Result<(P, Option<P>)>
    where
        P: DeserializeOwned + Default,
    {
        let desired = parse_properties(self.resource_properties.as_ref(), "ResourceProperties")?;

        // Only updates carry a meaningful previous state.
        if self.request_type != Operation::Update.as_str() {
            return Ok((desired, None));
        }

        let prior = parse_properties(
            self.old_resource_properties.as_ref(),
            "OldResourceProperties",
        )?;
        Ok((desired, Some(prior)))
    }

    /// Build the typed event for a handler expecting `expected_type`.
    pub fn event<P>(&self, expected_type: &str) -> Result<Event<P>>
    where
        P: DeserializeOwned + Default,
    {
        self.check_resource_type(expected_type)?;
        let operation = self.operation()?;
        let (desired, prior) = self.properties::<P>()?;

        debug!(
            operation = %operation,
            has_prior = prior.is_some(),
            "Parsed request"
        );

        let event = Event::new(operation, desired, self.context());
        Ok(match prior {
            Some(prior) => event.with_prior(prior),
            None => event,
        })
    }
}

fn parse_properties<P>(value: Option<&Value>, field: &'static str) -> Result<P>
where
    P: DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => Ok(P::default()),
        Some(Value::String(s)) if s.is_empty() => Ok(P::default()),
        Some(value) => P::deserialize(value)
            .map_err(|e| Error::properties_parse_failed(field, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct TestProps {
        #[serde(rename = "Key1", default)]
        key1: String,
    }

    fn request(request_type: &str) -> Request {
        Request {
            request_type: request_type.to_string(),
            stack_id: "stack1".to_string(),
            request_id: "1234".to_string(),
            resource_type: "Custom::TestResource".to_string(),
            logical_resource_id: "resource1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_wire_envelope() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let raw = json!({
            "RequestType": "Update",
            "ResponseURL": "https://example.com/presigned",
            "StackId": "arn:aws:cloudformation:eu-west-1:1:stack/s/1",
            "RequestId": "r-1",
            "ResourceType": "Custom::TestResource",
            "LogicalResourceId": "Res",
            "PhysicalResourceId": "phys-1",
            "ResourceProperties": {"Key1": "new"},
            "OldResourceProperties": {"Key1": "old"}
        });
        let req: Request = serde_json::from_value(raw)?;

        assert_eq!(req.response_url, "https://example.com/presigned");
        assert_eq!(req.physical_resource_id.as_deref(), Some("phys-1"));
        assert_eq!(req.operation()?, Operation::Update);
        Ok(())
    }

    #[test]
    fn test_reported_physical_id_ignores_empty() {
        let mut req = request("Delete");
        assert_eq!(req.reported_physical_id(), None);

        req.physical_resource_id = Some(String::new());
        assert_eq!(req.reported_physical_id(), None);

        req.physical_resource_id = Some("phys-1".to_string());
        assert_eq!(req.reported_physical_id(), Some("phys-1"));
    }

    #[test]
    fn test_missing_fields_default() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let req: Request = serde_json::from_value(json!({"RequestType": "Delete"}))?;
        assert!(req.response_url.is_empty());
        assert!(req.resource_properties.is_none());
        Ok(())
    }

    #[test]
    fn test_properties_update() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut req = request("Update");
        req.resource_properties = Some(json!({"Key1": "value1"}));
        req.old_resource_properties = Some(json!({"Key1": "value2"}));

        let (new, old) = req.properties::<TestProps>()?;
        assert_eq!(new.key1, "value1");
        assert_eq!(old.map(|o| o.key1), Some("value2".to_string()));
        Ok(())
    }

    #[test]
    fn test_properties_ignore_old_when_not_update()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut req = request("Create");
        req.resource_properties = Some(json!({"Key1": "value1"}));
        req.old_resource_properties = Some(json!({"Key1": "value2"}));

        let (new, old) = req.properties::<TestProps>()?;
        assert_eq!(new.key1, "value1");
        assert!(old.is_none());
        Ok(())
    }

    #[test]
    fn test_properties_absent() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let req = request("Update");
        let (new, old) = req.properties::<TestProps>()?;
        assert_eq!(new, TestProps::default());
        assert_eq!(old, Some(TestProps::default()));
        Ok(())
    }

    #[test]
    fn test_properties_empty_values() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut req = request("Update");
        req.resource_properties = Some(json!(""));
        req.old_resource_properties = Some(Value::Null);

        let (new, old) = req.properties::<TestProps>()?;
        assert_eq!(new, TestProps::default());
        assert_eq!(old, Some(TestProps::default()));
        Ok(())
    }

    #[test]
    fn test_properties_wrong_values_new() {
        let mut req = request("Create");
        req.resource_properties = Some(json!({"Key1": 123}));

        let result = req.properties::<TestProps>();
        assert!(matches!(
            result,
            Err(Error::PropertiesParseFailed {
                field: "ResourceProperties",
                ..
            })
        ));
    }

    #[test]
    fn test_properties_wrong_values_old() {
        let mut req = request("Update");
        req.old_resource_properties = Some(json!({"Key1": 123}));

        let result = req.properties::<TestProps>();
        assert!(matches!(
            result,
            Err(Error::PropertiesParseFailed {
                field: "OldResourceProperties",
                ..
            })
        ));
    }

    #[test]
    fn test_event_rejects_wrong_resource_type() {
        let req = request("Create");
        let result = req.event::<TestProps>("Custom::Other");
        assert!(matches!(result, Err(Error::WrongResourceType { .. })));
    }

    #[test]
    fn test_event_rejects_unknown_request_type() {
        let req = request("Replace");
        let result = req.event::<TestProps>("Custom::TestResource");
        assert!(matches!(result, Err(Error::UnknownRequestType { .. })));
    }

    #[test]
    fn test_event_carries_context() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut req = request("Update");
        req.resource_properties = Some(json!({"Key1": "new"}));
        req.old_resource_properties = Some(json!({"Key1": "old"}));

        let event = req.event::<TestProps>("Custom::TestResource")?;
        assert_eq!(event.operation, Operation::Update);
        assert_eq!(event.desired.key1, "new");
        assert_eq!(event.prior.map(|p| p.key1), Some("old".to_string()));
        assert_eq!(event.stack.request_id, "1234");
        assert_eq!(event.stack.logical_resource_id, "resource1");
        Ok(())
    }
}
