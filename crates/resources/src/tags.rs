//! Tag kinds.
//!
//! Attach tags to things CloudFormation cannot tag itself: IAM roles and
//! arbitrary ECS resources. The stack tags are added on top of the declared
//! ones by the tag reconciler.

use std::collections::HashSet;

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{Properties, Tag, TaggedResource};
use serde::{Deserialize, Serialize};

/// `ResourceType` of the IAM role tag kind.
pub const IAM_ROLE_TAGS: &str = "Custom::IAMRoleTags";

/// `ResourceType` of the ECS resource tag kind.
pub const ECS_RESOURCE_TAGS: &str = "Custom::ECSResourceTags";

/// Reject empty and repeated keys.
fn validate_tags(tags: &[Tag]) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, tag) in tags.iter().enumerate() {
        if tag.key.trim().is_empty() {
            return Err(Error::invalid_field(
                format!("Tags[{index}].Key"),
                "must be set",
            ));
        }
        if !seen.insert(tag.key.as_str()) {
            return Err(Error::invalid_field(
                format!("Tags[{index}].Key"),
                format!("duplicate key {}", tag.key),
            ));
        }
    }
    Ok(())
}

/// Tags on an IAM role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IamRoleTags {
    pub role_name: String,
    pub tags: Vec<Tag>,
}

impl Properties for IamRoleTags {
    const RESOURCE_TYPE: &'static str = IAM_ROLE_TAGS;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("RoleName", &self.role_name)]
    }

    fn physical_id(&self) -> String {
        format!("{}-tag", self.role_name)
    }

    fn validate(&self) -> Result<()> {
        validate_tags(&self.tags)
    }
}

impl TaggedResource for IamRoleTags {
    fn target(&self) -> &str {
        &self.role_name
    }

    fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// Tags on an ECS cluster, service, task definition or container instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EcsResourceTags {
    #[serde(alias = "ResourceARN")]
    pub resource_arn: String,
    pub tags: Vec<Tag>,
}

impl Properties for EcsResourceTags {
    const RESOURCE_TYPE: &'static str = ECS_RESOURCE_TAGS;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("ResourceArn", &self.resource_arn)]
    }

    fn physical_id(&self) -> String {
        format!("{}-tag", self.resource_arn)
    }

    fn validate(&self) -> Result<()> {
        validate_tags(&self.tags)
    }
}

impl TaggedResource for EcsResourceTags {
    fn target(&self) -> &str {
        &self.resource_arn
    }

    fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_role_tags() -> std::result::Result<(), serde_json::Error> {
        let tags: IamRoleTags = serde_json::from_value(json!({
            "RoleName": "app-role",
            "Tags": [{"Key": "team", "Value": "identity"}, {"Key": "env", "Value": "prod"}]
        }))?;

        assert_eq!(tags.physical_id(), "app-role-tag");
        assert_eq!(tags.target(), "app-role");
        assert_eq!(tags.keys(), vec!["team".to_string(), "env".to_string()]);
        assert_eq!(tags.validate(), Ok(()));
        Ok(())
    }

    #[test]
    fn test_parse_ecs_tags() -> std::result::Result<(), serde_json::Error> {
        let arn = "arn:aws:ecs:eu-west-1:1:service/cluster/web";
        let tags: EcsResourceTags = serde_json::from_value(json!({
            "ResourceArn": arn,
            "Tags": [{"Key": "team", "Value": "identity"}]
        }))?;

        assert_eq!(tags.physical_id(), format!("{arn}-tag"));
        assert_eq!(tags.missing_identity(), None);
        Ok(())
    }

    #[test]
    fn test_empty_target_is_missing_identity() {
        assert_eq!(IamRoleTags::default().missing_identity(), Some("RoleName"));
        assert_eq!(
            EcsResourceTags::default().missing_identity(),
            Some("ResourceArn")
        );
    }

    #[test]
    fn test_rejects_bad_keys() {
        let blank = IamRoleTags {
            role_name: "role".to_string(),
            tags: vec![Tag::new("", "x")],
        };
        let repeated = IamRoleTags {
            role_name: "role".to_string(),
            tags: vec![Tag::new("team", "a"), Tag::new("team", "b")],
        };

        assert_eq!(
            blank.validate(),
            Err(Error::invalid_field("Tags[0].Key", "must be set"))
        );
        assert_eq!(
            repeated.validate(),
            Err(Error::invalid_field("Tags[1].Key", "duplicate key team"))
        );
    }
}
