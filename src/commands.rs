//! Command implementations.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use custom_cf_core::ResultExt;
use custom_cf_events::Request;
use custom_cf_reconciler::NOT_AVAILABLE;
use custom_cf_resources::{Inspection, ResourceKind};
use custom_cf_respond::{DeliveryConfig, ResponseClient, ResponseEnvelope};
use tracing::{info, warn};

use crate::cli::{RespondArgs, StatusArg};

/// Reason reported when failing a request without one.
pub const DEFAULT_REASON: &str = "Failed by operator";

/// Read a request from a JSON file.
pub fn load_request(path: &Path) -> Result<Request> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse request {}", path.display()))
}

/// Check a request as its provider would.
pub fn inspect(request: &Request) -> Result<Inspection> {
    let kind = ResourceKind::from_resource_type(&request.resource_type)?;
    let inspection = kind
        .inspect(request)
        .with_context(|| format!("{kind} would reject this request"))?;
    Ok(inspection)
}

/// Physical id to answer `request` with.
///
/// An explicit id wins, then the one the orchestrator sent, then the one the
/// provider would derive.
pub fn physical_id(request: &Request, explicit: Option<&str>) -> String {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    if let Some(id) = request.reported_physical_id() {
        return id.to_string();
    }
    ResourceKind::detect(request)
        .and_then(|kind| kind.inspect(request).into_option_logged())
        .map_or_else(|| NOT_AVAILABLE.to_string(), |inspection| inspection.physical_id)
}

/// Envelope for a hand-made answer to `request`.
pub fn envelope(request: &Request, args: &RespondArgs) -> ResponseEnvelope {
    let stack = request.context();
    let id = physical_id(request, args.physical_id.as_deref());

    match args.status {
        StatusArg::Success => {
            if args.reason.is_some() {
                warn!("Ignoring reason on a success");
            }
            ResponseEnvelope::success(&stack, id, BTreeMap::new())
        }
        StatusArg::Failed => ResponseEnvelope::failed(
            &stack,
            id,
            args.reason.as_deref().unwrap_or(DEFAULT_REASON),
        ),
    }
}

/// Deliver (or with `--dry-run`, print) a status for the request in `args`.
pub async fn respond(args: &RespondArgs) -> Result<ResponseEnvelope> {
    let request = load_request(&args.event)?;
    let envelope = envelope(&request, args);

    if args.dry_run {
        return Ok(envelope);
    }

    let config = match &args.config {
        Some(path) => DeliveryConfig::from_file(path)
            .with_context(|| format!("Failed to load delivery config {}", path.display()))?,
        None => DeliveryConfig::from_env(),
    };
    let client = ResponseClient::with_config(config).context("Failed to build HTTP client")?;

    client
        .deliver(&request.response_url, &envelope)
        .await
        .context("Failed to deliver status")?;
    info!(
        status = %envelope.status,
        physical_id = %envelope.physical_resource_id,
        "Status delivered"
    );
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use custom_cf_respond::Status;
    use serde_json::json;

    fn args(event: PathBuf, status: StatusArg) -> RespondArgs {
        RespondArgs {
            event,
            status,
            reason: None,
            physical_id: None,
            config: None,
            dry_run: true,
        }
    }

    fn request(request_type: &str) -> Request {
        Request {
            request_type: request_type.to_string(),
            response_url: "https://example.com/presigned".to_string(),
            stack_id: "arn:aws:cloudformation:eu-west-1:1:stack/auth/1".to_string(),
            request_id: "1234".to_string(),
            resource_type: "Custom::CognitoUserPoolDomain".to_string(),
            logical_resource_id: "Domain".to_string(),
            resource_properties: Some(json!({"Domain": "auth", "UserPoolId": "pool"})),
            ..Request::default()
        }
    }

    #[test]
    fn test_load_request_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", serde_json::to_string(&request("Create"))?)?;

        let loaded = load_request(file.path())?;

        assert_eq!(loaded.resource_type, "Custom::CognitoUserPoolDomain");
        assert_eq!(loaded.response_url, "https://example.com/presigned");
        Ok(())
    }

    #[test]
    fn test_load_request_reports_path() {
        let result = load_request(Path::new("/nonexistent/event.json"));

        assert!(matches!(result, Err(e) if e.to_string().contains("/nonexistent/event.json")));
    }

    #[test]
    fn test_inspect_known_kind() -> Result<()> {
        let inspection = inspect(&request("Create"))?;

        assert_eq!(inspection.physical_id, "auth");
        assert_eq!(inspection.function, "userpool-domain");
        Ok(())
    }

    #[test]
    fn test_inspect_unknown_kind() {
        let mut req = request("Create");
        req.resource_type = "Custom::Nope".to_string();

        assert!(inspect(&req).is_err());
    }

    #[test]
    fn test_physical_id_precedence() {
        let mut req = request("Update");

        assert_eq!(physical_id(&req, None), "auth");

        req.physical_resource_id = Some("reported".to_string());
        assert_eq!(physical_id(&req, None), "reported");
        assert_eq!(physical_id(&req, Some("explicit")), "explicit");

        let mut unknown = request("Create");
        unknown.resource_type = "Custom::Nope".to_string();
        assert_eq!(physical_id(&unknown, None), NOT_AVAILABLE);
    }

    #[test]
    fn test_failed_envelope_defaults_reason() {
        let req = request("Create");

        let failed = envelope(&req, &args(PathBuf::new(), StatusArg::Failed));

        assert_eq!(failed.status, Status::Failed);
        assert_eq!(failed.reason.as_deref(), Some(DEFAULT_REASON));
        assert_eq!(failed.logical_resource_id, "Domain");
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        let mut req = request("Delete");
        req.response_url = "http://127.0.0.1:1/never".to_string();
        write!(file, "{}", serde_json::to_string(&req)?)?;

        let envelope = respond(&args(file.path().to_path_buf(), StatusArg::Success)).await?;

        assert_eq!(envelope.status, Status::Success);
        assert_eq!(envelope.physical_resource_id, "auth");
        Ok(())
    }
}
