//! Resource kinds served by the custom-cf providers.
//!
//! Each module holds the typed template properties of one kind, its identity
//! and physical id rules, its validation and the live snapshot its backend
//! reports:
//!
//! | kind | strategy |
//! |---|---|
//! | [`UserPoolDomain`], [`UserPoolClient`], [`UserPoolFederation`] | engine |
//! | [`UserPoolMfa`], [`UiCustomization`], [`IdentityPoolRoles`] | settings |
//! | [`IamRoleTags`], [`EcsResourceTags`] | tags |
//!
//! [`ResourceKind`] ties a `ResourceType` to its kind.

pub mod de;
pub mod domain;
pub mod federation;
pub mod kind;
pub mod mfa;
pub mod pool_client;
pub mod roles;
pub mod tags;
pub mod ui;

pub use domain::{CustomDomainConfig, DomainDescription, UserPoolDomain};
pub use federation::{ProviderDescription, ProviderType, UserPoolFederation};
pub use kind::{Inspection, ResourceKind, Strategy};
pub use mfa::{MfaMode, UserPoolMfa};
pub use pool_client::{ClientDescription, ClientSummary, UserPoolClient, find_client};
pub use roles::{IdentityPoolRoles, MappingType, RoleMapping};
pub use tags::{EcsResourceTags, IamRoleTags};
pub use ui::{DEFAULT_CSS, UiCustomization, UiDescription};
