//! User pool app client.
//!
//! The management API only looks clients up by id, which the template does
//! not know, so the live client is found by listing the pool and matching on
//! the name. Whether a client has a secret is fixed at creation: flipping
//! `GenerateSecret` means a new client.

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{
    Attributes, BackendResult, PagedListing, Properties, Resource, find_by_name,
};
use serde::{Deserialize, Serialize};

use crate::de::{bool_from_any, opt_u32_from_any};

/// `ResourceType` of the client kind.
pub const RESOURCE_TYPE: &str = "Custom::CognitoUserPoolClient";

/// Longest refresh token validity the service accepts, in days.
pub const MAX_REFRESH_TOKEN_VALIDITY: u32 = 3650;

/// Pinpoint analytics settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnalyticsConfiguration {
    pub application_id: String,
    pub external_id: String,
    pub role_arn: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub user_data_shared: bool,
}

/// Template properties of a user pool client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPoolClient {
    pub client_name: String,
    pub user_pool_id: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub generate_secret: bool,
    #[serde(deserialize_with = "opt_u32_from_any")]
    pub refresh_token_validity: Option<u32>,
    pub read_attributes: Vec<String>,
    pub write_attributes: Vec<String>,
    pub explicit_auth_flows: Vec<String>,
    #[serde(rename = "AllowedOAuthFlows")]
    pub allowed_oauth_flows: Vec<String>,
    #[serde(rename = "AllowedOAuthFlowsUserPoolClient", deserialize_with = "bool_from_any")]
    pub allowed_oauth_flows_user_pool_client: bool,
    #[serde(rename = "AllowedOAuthScopes")]
    pub allowed_oauth_scopes: Vec<String>,
    #[serde(rename = "CallbackURLs")]
    pub callback_urls: Vec<String>,
    #[serde(rename = "LogoutURLs")]
    pub logout_urls: Vec<String>,
    #[serde(rename = "DefaultRedirectURI")]
    pub default_redirect_uri: String,
    pub supported_identity_providers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_configuration: Option<AnalyticsConfiguration>,
}

/// Live state of a client as the backend describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDescription {
    pub client_id: String,
    pub client_name: String,
    pub user_pool_id: String,
    /// Present only for clients created with a secret.
    pub client_secret: Option<String>,
}

/// One entry of a client listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSummary {
    pub client_id: String,
    pub client_name: String,
}

/// Find the client called `name` in a pool's client listing.
///
/// Client names are not unique; the last listed match wins.
pub async fn find_client<L>(listing: &L, name: &str) -> BackendResult<Option<ClientSummary>>
where
    L: PagedListing<Item = ClientSummary> + ?Sized,
{
    find_by_name(listing, name, |c: &ClientSummary| c.client_name.as_str()).await
}

impl Properties for UserPoolClient {
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("UserPoolId", &self.user_pool_id),
            ("ClientName", &self.client_name),
        ]
    }

    fn physical_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.user_pool_id, self.generate_secret, self.client_name
        )
    }

    fn validate(&self) -> Result<()> {
        if let Some(days) = self
            .refresh_token_validity
            .filter(|days| !(1..=MAX_REFRESH_TOKEN_VALIDITY).contains(days))
        {
            return Err(Error::invalid_field(
                "RefreshTokenValidity",
                format!("{days} is outside 1..={MAX_REFRESH_TOKEN_VALIDITY}"),
            ));
        }

        if !self.default_redirect_uri.is_empty()
            && !self.callback_urls.contains(&self.default_redirect_uri)
        {
            return Err(Error::invalid_field(
                "DefaultRedirectURI",
                "must be one of the CallbackURLs",
            ));
        }

        if self
            .analytics_configuration
            .as_ref()
            .is_some_and(|analytics| analytics.application_id.trim().is_empty())
        {
            return Err(Error::invalid_field(
                "AnalyticsConfiguration.ApplicationId",
                "required when analytics are configured",
            ));
        }

        Ok(())
    }
}

impl Resource for UserPoolClient {
    type Snapshot = ClientDescription;

    fn name(&self) -> &str {
        &self.client_name
    }

    fn attributes(&self, snapshot: &ClientDescription) -> Attributes {
        let mut attributes = Attributes::from([
            ("ClientId".to_string(), snapshot.client_id.clone()),
            ("ClientName".to_string(), snapshot.client_name.clone()),
            ("UserPoolId".to_string(), snapshot.user_pool_id.clone()),
        ]);
        if let Some(secret) = &snapshot.client_secret {
            attributes.insert("ClientSecret".to_string(), secret.clone());
        }
        attributes
    }

    fn requires_replacement(&self, current: &ClientDescription) -> bool {
        self.generate_secret != current.client_secret.is_some()
    }
}
