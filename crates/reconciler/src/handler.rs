//! Invocation handler.
//!
//! Turns one raw request into exactly one status envelope. Reconciliation
//! never fails the invocation: every error is folded into a `FAILED` outcome
//! and delivered like a success would be.

use custom_cf_events::{Operation, Request};
use custom_cf_respond::{ResponseClient, ResponseEnvelope};
use tracing::{Instrument, error, info, info_span, warn};

use crate::backend::{Attributes, Properties};
use crate::types::{Outcome, Reconcile};

/// Physical id reported when the request could not be understood.
pub const NOT_AVAILABLE: &str = "NotAvailable";

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";

/// Static fields attached to every invocation span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub service: String,
    pub environment: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            service: "custom-cf".to_string(),
            environment: String::new(),
        }
    }
}

impl HandlerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            environment: lookup(ENVIRONMENT_ENV).unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Entry point of one provider function.
pub struct Handler<K> {
    function: String,
    reconciler: K,
    client: ResponseClient,
    config: HandlerConfig,
}

impl<K: Reconcile> Handler<K> {
    /// Create a new handler.
    pub fn new(function: impl Into<String>, reconciler: K, client: ResponseClient) -> Self {
        Self {
            function: function.into(),
            reconciler,
            client,
            config: HandlerConfig::default(),
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Reconcile `request` and deliver its status.
    ///
    /// Only a delivery failure is returned as an error.
    pub async fn handle(&self, request: &Request) -> custom_cf_respond::Result<Outcome> {
        let span = info_span!(
            "invocation",
            service = %self.config.service,
            function = %self.function,
            env = %self.config.environment,
            stack_id = %request.stack_id,
            request_type = %request.request_type,
            request_id = %request.request_id,
            logical_resource_id = %request.logical_resource_id,
        );

        async {
            info!("Function started");

            let (physical_id, outcome) = self.run(request).await;
            let stack = request.context();
            let envelope = match &outcome {
                Outcome::Success { attributes } => {
                    ResponseEnvelope::success(&stack, physical_id, attributes.clone())
                }
                Outcome::Failed { reason } => {
                    error!(reason = %reason, "Reconciliation failed");
                    ResponseEnvelope::failed(&stack, physical_id, reason.clone())
                }
            };

            let delivered = self.client.deliver(&request.response_url, &envelope).await;
            if let Err(e) = &delivered {
                error!(error = %e, "Couldn't deliver status");
            }

            info!("Function finished");
            delivered.map(|()| outcome)
        }
        .instrument(span)
        .await
    }

    /// Reconcile `request` without delivering anything.
    ///
    /// Returns the physical id to report with the outcome.
    pub async fn run(&self, request: &Request) -> (String, Outcome) {
        let event = match request.event::<K::Spec>(<K::Spec as Properties>::RESOURCE_TYPE) {
            Ok(event) => event,
            Err(e) => {
                let physical_id = request
                    .reported_physical_id()
                    .unwrap_or(NOT_AVAILABLE)
                    .to_string();

                // A create rejected for its properties left nothing behind.
                if is_unparseable_delete(request, &e) {
                    warn!(error = %e, physical_id = %physical_id, "Nothing to delete");
                    let attributes = Attributes::new();
                    return (physical_id, Outcome::Success { attributes });
                }

                return (physical_id, Outcome::failed(e.to_string()));
            }
        };

        let physical_id = if event.is_delete() {
            request
                .reported_physical_id()
                .map_or_else(|| event.desired.physical_id(), str::to_string)
        } else {
            event.desired.physical_id()
        };

        let result = self.reconciler.reconcile(&event).await;
        if let Ok(reconciled) = &result {
            info!(
                action = %reconciled.action,
                physical_id = %physical_id,
                attributes = reconciled.attributes.len(),
                "Reconciled"
            );
        }

        (physical_id, Outcome::from(result))
    }
}

fn is_unparseable_delete(request: &Request, error: &custom_cf_core::Error) -> bool {
    matches!(error, custom_cf_core::Error::PropertiesParseFailed { .. })
        && matches!(request.operation(), Ok(Operation::Delete))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use custom_cf_respond::DeliveryConfig;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::backend::Resource;
    use crate::memory::InMemoryBackend;
    use crate::reconciler::Reconciler;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Domain {
        #[serde(default)]
        domain: String,
        #[serde(default)]
        user_pool_id: String,
    }

    impl Properties for Domain {
        const RESOURCE_TYPE: &'static str = "Custom::TestDomain";

        fn identity_fields(&self) -> Vec<(&'static str, &str)> {
            vec![("Domain", &self.domain), ("UserPoolId", &self.user_pool_id)]
        }

        fn physical_id(&self) -> String {
            self.domain.clone()
        }
    }

    impl Resource for Domain {
        type Snapshot = String;

        fn name(&self) -> &str {
            &self.domain
        }

        fn attributes(&self, snapshot: &String) -> Attributes {
            Attributes::from([("Domain".to_string(), snapshot.clone())])
        }
    }

    type TestHandler = Handler<Reconciler<Domain, InMemoryBackend<Domain>>>;

    fn handler(max_attempts: u32) -> Result<(Arc<InMemoryBackend<Domain>>, TestHandler), Box<dyn std::error::Error>> {
        let backend = Arc::new(InMemoryBackend::new(|d: &Domain| {
            format!("{}.cloudfront.net", d.domain)
        }));
        let client = ResponseClient::with_config(
            DeliveryConfig::default()
                .timeout(Duration::from_millis(500))
                .max_attempts(max_attempts),
        )?;
        let handler = Handler::new("userpool-domain", Reconciler::new(backend.clone()), client);
        Ok((backend, handler))
    }

    fn request(server: &MockServer, request_type: &str, properties: serde_json::Value) -> Request {
        Request {
            request_type: request_type.to_string(),
            response_url: format!("{}/presigned", server.uri()),
            stack_id: "stack1".to_string(),
            request_id: "1234".to_string(),
            resource_type: "Custom::TestDomain".to_string(),
            logical_resource_id: "Domain".to_string(),
            resource_properties: Some(properties),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_delivers_success() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/presigned"))
            .and(body_json(json!({
                "Status": "SUCCESS",
                "PhysicalResourceId": "auth",
                "StackId": "stack1",
                "RequestId": "1234",
                "LogicalResourceId": "Domain",
                "Data": {"Domain": "auth.cloudfront.net"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (backend, handler) = handler(5)?;
        let req = request(&server, "Create", json!({"Domain": "auth", "UserPoolId": "pool"}));

        let outcome = handler.handle(&req).await?;

        assert!(outcome.is_success());
        assert!(backend.get("auth").await.is_some());
        server.verify().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_resource_type_delivers_failure() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_json(json!({
                "Status": "FAILED",
                "Reason": "wrong ResourceType in request: expected Custom::TestDomain but got Custom::Other",
                "PhysicalResourceId": "NotAvailable",
                "StackId": "stack1",
                "RequestId": "1234",
                "LogicalResourceId": "Domain"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (backend, handler) = handler(5)?;
        let mut req = request(&server, "Create", json!({"Domain": "auth", "UserPoolId": "pool"}));
        req.resource_type = "Custom::Other".to_string();

        let outcome = handler.handle(&req).await?;

        assert!(!outcome.is_success());
        assert!(backend.calls().await.is_empty());
        server.verify().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_field_delivers_failure() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (_, handler) = handler(5)?;
        let req = request(&server, "Create", json!({"Domain": "auth"}));

        let outcome = handler.handle(&req).await?;

        assert_eq!(outcome, Outcome::failed("no UserPoolId specified"));
        server.verify().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_echoes_physical_id() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        let (backend, handler) = handler(5)?;
        let mut req = request(&server, "Delete", json!({"Domain": "auth", "UserPoolId": "pool"}));
        req.physical_resource_id = Some("legacy-id".to_string());

        let (physical_id, outcome) = handler.run(&req).await;

        assert_eq!(physical_id, "legacy-id");
        assert_eq!(outcome, Outcome::Success { attributes: Attributes::new() });
        assert_eq!(backend.calls().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unparseable_properties_report_not_available() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        let (_, handler) = handler(5)?;
        let req = request(&server, "Create", json!({"Domain": ["not", "a", "string"]}));

        let (physical_id, outcome) = handler.run(&req).await;

        assert_eq!(physical_id, NOT_AVAILABLE);
        assert!(matches!(outcome, Outcome::Failed { reason } if reason.contains("ResourceProperties")));
        Ok(())
    }

    #[tokio::test]
    async fn test_unparseable_delete_succeeds_without_backend() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        let (backend, handler) = handler(5)?;
        let mut req = request(&server, "Delete", json!({"Domain": ["not", "a", "string"]}));
        req.physical_resource_id = Some(NOT_AVAILABLE.to_string());

        let (physical_id, outcome) = handler.run(&req).await;

        assert_eq!(physical_id, NOT_AVAILABLE);
        assert_eq!(outcome, Outcome::Success { attributes: Attributes::new() });
        assert!(backend.calls().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_of_wrong_resource_type_still_fails() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        let (_, handler) = handler(5)?;
        let mut req = request(&server, "Delete", json!({"Domain": "auth", "UserPoolId": "pool"}));
        req.resource_type = "Custom::Other".to_string();

        let (_, outcome) = handler.run(&req).await;

        assert!(!outcome.is_success());
        Ok(())
    }

    #[tokio::test]
    async fn test_delivery_failure_is_returned() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let (backend, handler) = handler(2)?;
        let req = request(&server, "Create", json!({"Domain": "auth", "UserPoolId": "pool"}));

        let result = handler.handle(&req).await;

        assert!(result.is_err());
        assert!(backend.get("auth").await.is_some());
        server.verify().await;
        Ok(())
    }

    #[test]
    fn test_handler_config_from_lookup() {
        let vars = HashMap::from([(ENVIRONMENT_ENV, "prod".to_string())]);
        let config = HandlerConfig::from_lookup(|key| vars.get(key).cloned());

        assert_eq!(config.service, "custom-cf");
        assert_eq!(config.environment, "prod");
    }
}
