//! Governance resolution for a fleet of repositories.
//!
//! This crate provides:
//! - **Teams**: Team registry with default teams and member roles
//! - **Overrides**: Global and per-repository variables, secrets, webhooks and status checks
//! - **Repositories**: Team grants, environments and deployment policies
//! - **Branch Protection**: Rules derived from the team registry and status checks
//! - **Zones**: DNS records bound to declared zones
//!
//! The crate only computes the desired state. Materializing it is left to a
//! provisioning layer, which receives a [`ResolvedModel`].
//!
//! # Example
//!
//! ```
//! use fleet_governance::{resolve, GovernanceSettings, OverrideStore, RepositoryConfig};
//!
//! let settings = GovernanceSettings::new("acme");
//!
//! let repos = RepositoryConfig::parse_list(r#"
//! - name: svc
//!   visibility: public
//!   environments: [sandbox, production]
//! "#).unwrap();
//!
//! let mut store = OverrideStore::new();
//! store.add_deployment_branches("sandbox", ["dev/*"]);
//! store.add_deployment_branches("production", ["release/*"]);
//! store.add_variable("REGION", "eu-west-1", None);
//!
//! let model = resolve(&settings, vec![], &repos, &store).unwrap();
//! let svc = model.repository("svc").unwrap();
//!
//! // The admin default team is granted on every repository
//! assert_eq!(svc.teams["admin"].to_string(), "admin");
//!
//! // A sandbox gate exists, so production is not opened to every branch
//! assert_eq!(svc.environments["production"].deployment_policies, vec!["release/*"]);
//! assert!(svc.branch_protections.contains_key("production/*"));
//! ```

mod branch_protection;
mod config;
mod deferred;
mod environment;
mod error;
mod overrides;
mod permission;
mod repository;
mod resolver;
mod resource;
mod team;
mod team_resolver;
mod webhook;
mod zone;

pub use branch_protection::{BranchProtection, BranchProtectionPolicyBuilder, BypassActor};
pub use config::{
    GovernanceSettings, RepositoryConfig, RepositoryTeamConfig, TeamConfig, TeamMemberConfig,
    DEFAULT_TEAMS, ENV_PRODUCTION, ENV_SANDBOX, TEAM_ADMIN, WILDCARD_BRANCH_PATTERN,
    WILDCARD_SCOPE,
};
pub use deferred::Deferred;
pub use environment::Environment;
pub use error::{GovernanceError, Result};
pub use overrides::{OverrideStore, StatusChecks, ValueKind};
pub use permission::{Permission, TeamRole};
pub use repository::{Repository, Visibility};
pub use resolver::{
    resolve, RepoPolicyResolver, ResolvedModel, ACTIONS_ACCESS_ORG, VAR_REPO_ENVIRONMENTS,
    VAR_REPO_ENV_COMPARISON,
};
pub use resource::{ResourceId, ResourceNode};
pub use team::{ExportedTeam, Team, TeamIdentity, TeamRegistry};
pub use team_resolver::TeamResolver;
pub use webhook::{Hook, Webhook};
pub use zone::{
    AccountConfig, DnsConfig, DnsRecord, DnsRecordConfig, RecordType, Zone, ZoneConfig,
    ZoneRegistry, ZoneResolver, ZonesConfig,
};
