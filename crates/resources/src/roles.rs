//! Identity pool roles and role mappings.
//!
//! Settings kind: assigns the default authenticated and unauthenticated roles
//! of an identity pool and, per identity provider, how a user's token picks a
//! role. Mappings are checked up front since the service only reports the
//! first problem it finds.

use std::collections::BTreeMap;

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{Properties, Resource};
use serde::{Deserialize, Serialize};

/// `ResourceType` of the roles kind.
pub const RESOURCE_TYPE: &str = "Custom::CognitoIdentityPoolRoles";

/// Default roles of an identity pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roles {
    #[serde(rename = "authenticated", alias = "Authenticated")]
    pub authenticated: String,
    #[serde(
        rename = "unauthenticated",
        alias = "Unauthenticated",
        alias = "UnAuthenticated"
    )]
    pub unauthenticated: String,
}

impl Roles {
    /// Roles keyed the way the service expects them, empty ones left out.
    pub fn to_map(&self) -> BTreeMap<&'static str, &str> {
        [
            ("authenticated", self.authenticated.as_str()),
            ("unauthenticated", self.unauthenticated.as_str()),
        ]
        .into_iter()
        .filter(|(_, arn)| !arn.is_empty())
        .collect()
    }
}

/// How a mapping resolves the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingType {
    /// Use the role carried in the token's `cognito:roles` claim.
    Token,
    /// Evaluate [`MappingRule`]s in order.
    Rules,
}

/// What to do when no rule or more than one role matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmbiguousRoleResolution {
    AuthenticatedRole,
    Deny,
}

/// Comparison applied to a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    Equals,
    Contains,
    StartsWith,
    NotEqual,
}

/// One claim rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MappingRule {
    #[serde(default)]
    pub claim: String,
    pub match_type: MatchType,
    #[serde(default)]
    pub value: String,
    #[serde(default, alias = "RoleARN")]
    pub role_arn: String,
}

/// Role mapping of one identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleMapping {
    /// Provider key such as `cognito-idp.<region>.amazonaws.com/<pool>:<client>`.
    #[serde(default)]
    pub identity_provider: String,
    #[serde(rename = "Type")]
    pub mapping_type: MappingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguous_role_resolution: Option<AmbiguousRoleResolution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<MappingRule>,
}

impl RoleMapping {
    fn validate(&self, index: usize) -> Result<()> {
        let at = |field: &str| format!("RoleMappings[{index}].{field}");

        if self.identity_provider.trim().is_empty() {
            return Err(Error::invalid_field(at("IdentityProvider"), "must be set"));
        }

        if self.mapping_type == MappingType::Rules && self.rules.is_empty() {
            return Err(Error::invalid_field(
                at("Rules"),
                "required when Type is Rules",
            ));
        }

        for (n, rule) in self.rules.iter().enumerate() {
            let empty = [
                ("Claim", &rule.claim),
                ("Value", &rule.value),
                ("RoleArn", &rule.role_arn),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = empty {
                return Err(Error::invalid_field(
                    at(&format!("Rules[{n}].{field}")),
                    "must be set",
                ));
            }
        }

        Ok(())
    }
}

/// Template properties of an identity pool's roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IdentityPoolRoles {
    pub identity_pool_id: String,
    pub roles: Roles,
    pub role_mappings: Vec<RoleMapping>,
}

impl IdentityPoolRoles {
    /// No roles and no mappings.
    pub fn defaults(identity_pool_id: impl Into<String>) -> Self {
        Self {
            identity_pool_id: identity_pool_id.into(),
            ..Self::default()
        }
    }
}

impl Properties for IdentityPoolRoles {
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("IdentityPoolId", &self.identity_pool_id)]
    }

    fn physical_id(&self) -> String {
        format!("{}-roles", self.identity_pool_id)
    }

    fn validate(&self) -> Result<()> {
        self.role_mappings
            .iter()
            .enumerate()
            .try_for_each(|(index, mapping)| mapping.validate(index))
    }
}

impl Resource for IdentityPoolRoles {
    type Snapshot = ();

    fn name(&self) -> &str {
        &self.identity_pool_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> std::result::Result<IdentityPoolRoles, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_parse_rules_mapping() -> std::result::Result<(), serde_json::Error> {
        let roles = parse(json!({
            "IdentityPoolId": "eu-west-1:1234",
            "Roles": {
                "authenticated": "arn:aws:iam::1:role/auth",
                "unauthenticated": "arn:aws:iam::1:role/guest"
            },
            "RoleMappings": [{
                "IdentityProvider": "cognito-idp.eu-west-1.amazonaws.com/pool:client",
                "Type": "Rules",
                "AmbiguousRoleResolution": "Deny",
                "Rules": [{
                    "Claim": "cognito:groups",
                    "MatchType": "Contains",
                    "Value": "admins",
                    "RoleArn": "arn:aws:iam::1:role/admin"
                }]
            }]
        }))?;

        assert_eq!(roles.physical_id(), "eu-west-1:1234-roles");
        assert_eq!(roles.roles.to_map().len(), 2);
        assert_eq!(roles.validate(), Ok(()));
        Ok(())
    }

    #[test]
    fn test_mapping_needs_identity_provider() -> std::result::Result<(), serde_json::Error> {
        let roles = parse(json!({
            "IdentityPoolId": "pool",
            "RoleMappings": [{"Type": "Token"}]
        }))?;

        assert_eq!(
            roles.validate(),
            Err(Error::invalid_field(
                "RoleMappings[0].IdentityProvider",
                "must be set"
            ))
        );
        Ok(())
    }

    #[test]
    fn test_rules_type_needs_rules() -> std::result::Result<(), serde_json::Error> {
        let roles = parse(json!({
            "IdentityPoolId": "pool",
            "RoleMappings": [
                {"IdentityProvider": "graph.facebook.com", "Type": "Token"},
                {"IdentityProvider": "accounts.google.com", "Type": "Rules"}
            ]
        }))?;

        assert_eq!(
            roles.validate(),
            Err(Error::invalid_field(
                "RoleMappings[1].Rules",
                "required when Type is Rules"
            ))
        );
        Ok(())
    }

    #[test]
    fn test_rule_fields_must_be_set() -> std::result::Result<(), serde_json::Error> {
        let roles = parse(json!({
            "IdentityPoolId": "pool",
            "RoleMappings": [{
                "IdentityProvider": "accounts.google.com",
                "Type": "Rules",
                "Rules": [{"Claim": "email", "MatchType": "Equals", "Value": "a@b.c"}]
            }]
        }))?;

        assert_eq!(
            roles.validate(),
            Err(Error::invalid_field(
                "RoleMappings[0].Rules[0].RoleArn",
                "must be set"
            ))
        );
        Ok(())
    }

    #[test]
    fn test_unknown_match_type_is_a_parse_error() {
        let parsed = parse(json!({
            "IdentityPoolId": "pool",
            "RoleMappings": [{
                "IdentityProvider": "accounts.google.com",
                "Type": "Rules",
                "Rules": [{"Claim": "email", "MatchType": "Regex", "Value": ".*", "RoleArn": "r"}]
            }]
        }));

        assert!(parsed.is_err());
    }

    #[test]
    fn test_defaults_are_empty() {
        let reset = IdentityPoolRoles::defaults("pool");

        assert!(reset.roles.to_map().is_empty());
        assert!(reset.role_mappings.is_empty());
        assert_eq!(reset.missing_identity(), None);
    }
}
