//! User pool identity provider.

use std::collections::BTreeMap;
use std::fmt;

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{Attributes, Properties, Resource};
use serde::{Deserialize, Serialize};

/// `ResourceType` of the federation kind.
pub const RESOURCE_TYPE: &str = "Custom::CognitoUserPoolFederation";

/// Kind of external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "SAML")]
    Saml,
    Facebook,
    Google,
    LoginWithAmazon,
    #[serde(rename = "OIDC")]
    Oidc,
}

impl ProviderType {
    /// Wire spelling of the provider type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saml => "SAML",
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::LoginWithAmazon => "LoginWithAmazon",
            Self::Oidc => "OIDC",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template properties of a federated identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPoolFederation {
    pub provider_name: String,
    pub provider_type: Option<ProviderType>,
    /// Provider specific settings such as `MetadataURL` or `client_id`.
    pub provider_details: BTreeMap<String, String>,
    /// User pool attribute to provider attribute.
    pub attribute_mapping: BTreeMap<String, String>,
    pub user_pool_id: String,
}

/// Live state of an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescription {
    pub provider_name: String,
    pub provider_type: ProviderType,
    pub user_pool_id: String,
}

impl Properties for UserPoolFederation {
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("UserPoolId", &self.user_pool_id),
            ("ProviderName", &self.provider_name),
        ]
    }

    fn physical_id(&self) -> String {
        format!("{}-{}", self.user_pool_id, self.provider_name)
    }

    fn validate(&self) -> Result<()> {
        if self.provider_type.is_none() {
            return Err(Error::missing_field("ProviderType"));
        }
        if self.provider_details.is_empty() {
            return Err(Error::missing_field("ProviderDetails"));
        }
        Ok(())
    }
}

impl Resource for UserPoolFederation {
    type Snapshot = ProviderDescription;

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn attributes(&self, snapshot: &ProviderDescription) -> Attributes {
        Attributes::from([
            ("ProviderName".to_string(), snapshot.provider_name.clone()),
            (
                "ProviderType".to_string(),
                snapshot.provider_type.to_string(),
            ),
            ("UserPoolId".to_string(), snapshot.user_pool_id.clone()),
        ])
    }

    fn requires_replacement(&self, current: &ProviderDescription) -> bool {
        self.provider_type
            .is_some_and(|wanted| wanted != current.provider_type)
    }
}
