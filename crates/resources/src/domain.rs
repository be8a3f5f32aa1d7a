//! User pool domain.
//!
//! Either an Amazon-hosted prefix (`auth` becomes
//! `auth.auth.<region>.amazoncognito.com`) or a custom domain fronted by a
//! CloudFront distribution. Domain names are global, so a live domain may
//! belong to a user pool this stack does not own.

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{Attributes, Properties, Resource};
use serde::{Deserialize, Serialize};

/// `ResourceType` of the domain kind.
pub const RESOURCE_TYPE: &str = "Custom::CognitoUserPoolDomain";

/// Certificate for a custom domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomDomainConfig {
    pub certificate_arn: String,
}

/// Template properties of a user pool domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPoolDomain {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain_config: Option<CustomDomainConfig>,
    pub user_pool_id: String,
}

impl UserPoolDomain {
    /// Whether this is a custom domain rather than a hosted prefix.
    pub const fn is_custom(&self) -> bool {
        self.custom_domain_config.is_some()
    }
}

/// Live state of a domain as the backend describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainDescription {
    pub domain: String,
    pub user_pool_id: String,
    /// Set for custom domains only.
    pub certificate_arn: Option<String>,
    /// Distribution serving the domain, once provisioned.
    pub cloudfront_domain: Option<String>,
}

impl Properties for UserPoolDomain {
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("Domain", &self.domain), ("UserPoolId", &self.user_pool_id)]
    }

    fn physical_id(&self) -> String {
        self.domain.clone()
    }

    fn validate(&self) -> Result<()> {
        match &self.custom_domain_config {
            Some(config) if config.certificate_arn.trim().is_empty() => Err(Error::invalid_field(
                "CustomDomainConfig.CertificateArn",
                "required for a custom domain",
            )),
            _ => Ok(()),
        }
    }
}

impl Resource for UserPoolDomain {
    type Snapshot = DomainDescription;

    fn name(&self) -> &str {
        &self.domain
    }

    fn attributes(&self, snapshot: &DomainDescription) -> Attributes {
        snapshot
            .cloudfront_domain
            .iter()
            .filter(|d| !d.is_empty())
            .map(|d| ("Domain".to_string(), d.clone()))
            .collect()
    }

    fn requires_replacement(&self, current: &DomainDescription) -> bool {
        self.is_custom() != current.certificate_arn.is_some()
    }

    fn conflict(&self, current: &DomainDescription) -> Option<String> {
        (current.user_pool_id != self.user_pool_id).then(|| {
            format!(
                "domain {} belongs to user pool {}, not {}",
                self.domain, current.user_pool_id, self.user_pool_id
            )
        })
    }
}
