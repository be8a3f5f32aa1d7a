//! User pool MFA configuration.
//!
//! Not a resource of its own: it writes the MFA settings of an existing user
//! pool. Removing it from the stack turns MFA off again.

use std::fmt;

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{Properties, Resource};
use serde::{Deserialize, Serialize};

use crate::de::bool_from_any;

/// `ResourceType` of the MFA kind.
pub const RESOURCE_TYPE: &str = "Custom::CognitoUserPoolMFA";

/// Pool wide MFA mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MfaMode {
    #[default]
    Off,
    On,
    Optional,
}

impl fmt::Display for MfaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Optional => "OPTIONAL",
        })
    }
}

/// SNS settings used to send SMS codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SmsConfiguration {
    pub sns_caller_arn: String,
    pub external_id: String,
}

/// SMS second factor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SmsMfaConfiguration {
    pub sms_authentication_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_configuration: Option<SmsConfiguration>,
}

/// TOTP second factor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SoftwareTokenMfaConfiguration {
    #[serde(deserialize_with = "bool_from_any")]
    pub enabled: bool,
}

/// Template properties of a user pool's MFA settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPoolMfa {
    pub mfa_configuration: MfaMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_mfa_configuration: Option<SmsMfaConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_token_mfa_configuration: Option<SoftwareTokenMfaConfiguration>,
    pub user_pool_id: String,
}

impl UserPoolMfa {
    /// Settings a pool is returned to when the resource goes away.
    pub fn defaults(user_pool_id: impl Into<String>) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            ..Self::default()
        }
    }

    /// Whether at least one second factor is configured.
    pub fn has_factor(&self) -> bool {
        self.sms_mfa_configuration.is_some()
            || self
                .software_token_mfa_configuration
                .as_ref()
                .is_some_and(|totp| totp.enabled)
    }
}

impl Properties for UserPoolMfa {
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("UserPoolId", &self.user_pool_id)]
    }

    fn physical_id(&self) -> String {
        format!("{}-mfa", self.user_pool_id)
    }

    fn validate(&self) -> Result<()> {
        if self.mfa_configuration != MfaMode::Off && !self.has_factor() {
            return Err(Error::invalid_field(
                "MfaConfiguration",
                format!(
                    "{} needs SmsMfaConfiguration or an enabled SoftwareTokenMfaConfiguration",
                    self.mfa_configuration
                ),
            ));
        }

        let sns_caller = self
            .sms_mfa_configuration
            .as_ref()
            .and_then(|sms| sms.sms_configuration.as_ref())
            .map(|sns| sns.sns_caller_arn.trim());
        if sns_caller == Some("") {
            return Err(Error::invalid_field(
                "SmsMfaConfiguration.SmsConfiguration.SnsCallerArn",
                "required when SmsConfiguration is set",
            ));
        }

        Ok(())
    }
}

impl Resource for UserPoolMfa {
    /// Mode the pool reports after the write.
    type Snapshot = MfaMode;

    fn name(&self) -> &str {
        &self.user_pool_id
    }
}
