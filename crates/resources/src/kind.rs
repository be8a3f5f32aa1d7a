//! Registry of the resource kinds.
//!
//! Maps a request's `ResourceType` to its kind and checks a request the way
//! the matching provider would, without any backend call.

use std::fmt;

use custom_cf_core::{Error, Result, ResultExt};
use custom_cf_events::{Operation, Request};
use custom_cf_reconciler::Properties;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::UserPoolDomain;
use crate::federation::UserPoolFederation;
use crate::mfa::UserPoolMfa;
use crate::pool_client::UserPoolClient;
use crate::roles::IdentityPoolRoles;
use crate::tags::{EcsResourceTags, IamRoleTags};
use crate::ui::UiCustomization;

/// How a kind is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Observe, plan and apply against an owned backend object.
    Engine,
    /// Write settings onto a parent object, reset on delete.
    Settings,
    /// Attach tags to an existing target.
    Tags,
}

/// Every kind a provider exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    UserPoolDomain,
    UserPoolClient,
    UserPoolFederation,
    UserPoolMfa,
    UiCustomization,
    IdentityPoolRoles,
    IamRoleTags,
    EcsResourceTags,
}

impl ResourceKind {
    pub const ALL: [Self; 8] = [
        Self::UserPoolDomain,
        Self::UserPoolClient,
        Self::UserPoolFederation,
        Self::UserPoolMfa,
        Self::UiCustomization,
        Self::IdentityPoolRoles,
        Self::IamRoleTags,
        Self::EcsResourceTags,
    ];

    /// `ResourceType` the kind answers to.
    pub const fn resource_type(self) -> &'static str {
        match self {
            Self::UserPoolDomain => <UserPoolDomain as Properties>::RESOURCE_TYPE,
            Self::UserPoolClient => <UserPoolClient as Properties>::RESOURCE_TYPE,
            Self::UserPoolFederation => <UserPoolFederation as Properties>::RESOURCE_TYPE,
            Self::UserPoolMfa => <UserPoolMfa as Properties>::RESOURCE_TYPE,
            Self::UiCustomization => <UiCustomization as Properties>::RESOURCE_TYPE,
            Self::IdentityPoolRoles => <IdentityPoolRoles as Properties>::RESOURCE_TYPE,
            Self::IamRoleTags => <IamRoleTags as Properties>::RESOURCE_TYPE,
            Self::EcsResourceTags => <EcsResourceTags as Properties>::RESOURCE_TYPE,
        }
    }

    /// Name of the provider function, used in log spans.
    pub const fn function(self) -> &'static str {
        match self {
            Self::UserPoolDomain => "userpool-domain",
            Self::UserPoolClient => "userpool-client",
            Self::UserPoolFederation => "userpool-federation",
            Self::UserPoolMfa => "userpool-mfa",
            Self::UiCustomization => "userpool-uicustomization",
            Self::IdentityPoolRoles => "identitypool-roles",
            Self::IamRoleTags => "iam-role-tags",
            Self::EcsResourceTags => "ecs-resource-tags",
        }
    }

    pub const fn strategy(self) -> Strategy {
        match self {
            Self::UserPoolDomain | Self::UserPoolClient | Self::UserPoolFederation => {
                Strategy::Engine
            }
            Self::UserPoolMfa | Self::UiCustomization | Self::IdentityPoolRoles => {
                Strategy::Settings
            }
            Self::IamRoleTags | Self::EcsResourceTags => Strategy::Tags,
        }
    }

    /// Look a kind up by `ResourceType`.
    pub fn from_resource_type(resource_type: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.resource_type() == resource_type)
            .ok_or_else(|| {
                Error::invalid_field(
                    "ResourceType",
                    format!("no provider handles {resource_type:?}"),
                )
            })
    }

    /// Kind of `request`, or `None` (logged) for an unknown `ResourceType`.
    pub fn detect(request: &Request) -> Option<Self> {
        Self::from_resource_type(&request.resource_type).into_option_logged()
    }

    /// Check `request` as this kind's provider would before reconciling.
    pub fn inspect(self, request: &Request) -> Result<Inspection> {
        match self {
            Self::UserPoolDomain => inspect_as::<UserPoolDomain>(self, request),
            Self::UserPoolClient => inspect_as::<UserPoolClient>(self, request),
            Self::UserPoolFederation => inspect_as::<UserPoolFederation>(self, request),
            Self::UserPoolMfa => inspect_as::<UserPoolMfa>(self, request),
            Self::UiCustomization => inspect_as::<UiCustomization>(self, request),
            Self::IdentityPoolRoles => inspect_as::<IdentityPoolRoles>(self, request),
            Self::IamRoleTags => inspect_as::<IamRoleTags>(self, request),
            Self::EcsResourceTags => inspect_as::<EcsResourceTags>(self, request),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

/// What a provider would do with a request, short of calling the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub function: &'static str,
    pub resource_type: &'static str,
    pub strategy: Strategy,
    pub operation: Operation,
    /// Physical id the status would be reported under.
    pub physical_id: String,
    /// A delete without identity: the provider answers without any call.
    pub skipped: bool,
}

fn inspect_as<P>(kind: ResourceKind, request: &Request) -> Result<Inspection>
where
    P: Properties + DeserializeOwned + Default,
{
    let event = request.event::<P>(P::RESOURCE_TYPE)?;
    let missing = event.desired.missing_identity();

    if !event.is_delete() {
        if let Some(field) = missing {
            return Err(Error::missing_field(field));
        }
        event.desired.validate()?;
    }

    let physical_id = match request.reported_physical_id() {
        Some(reported) if event.is_delete() => reported.to_string(),
        _ => event.desired.physical_id(),
    };
    debug!(kind = %kind, physical_id = %physical_id, "Inspected request");

    Ok(Inspection {
        function: kind.function(),
        resource_type: kind.resource_type(),
        strategy: kind.strategy(),
        operation: event.operation,
        physical_id,
        skipped: event.is_delete() && missing.is_some(),
    })
}
