//! Stable identifiers for resolved entities and their ordering edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one resource the provisioning layer will materialize.
///
/// Entities reference each other through these ids instead of live pointers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceId {
    Team { team: String },
    TeamMembership { team: String, username: String },
    Repository { repo: String },
    TeamGrant { repo: String, team: String },
    Environment { repo: String, environment: String },
    DeploymentPolicy {
        repo: String,
        environment: String,
        pattern: String,
    },
    BranchProtection { repo: String, pattern: String },
    Webhook { repo: String, hook: String },
    SharedWorkflowAccess { repo: String },
    Variable { repo: String, name: String },
    Secret { repo: String, name: String },
    EnvironmentVariable {
        repo: String,
        environment: String,
        name: String,
    },
    EnvironmentSecret {
        repo: String,
        environment: String,
        name: String,
    },
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Team { team } => write!(f, "team-{}", team),
            ResourceId::TeamMembership { team, username } => {
                write!(f, "team-{}-{}-membership", team, username)
            }
            ResourceId::Repository { repo } => write!(f, "{}", repo),
            ResourceId::TeamGrant { repo, team } => write!(f, "{}-teams-{}", repo, team),
            ResourceId::Environment { repo, environment } => {
                write!(f, "{}-env-{}", repo, environment)
            }
            ResourceId::DeploymentPolicy {
                repo,
                environment,
                pattern,
            } => write!(f, "{}-env-{}-deploymentPolicy-{}", repo, environment, pattern),
            ResourceId::BranchProtection { repo, pattern } => {
                write!(f, "{}-protection-{}", repo, pattern)
            }
            ResourceId::Webhook { repo, hook } => write!(f, "{}-webhook-{}", repo, hook),
            ResourceId::SharedWorkflowAccess { repo } => {
                write!(f, "{}-action-access-level", repo)
            }
            ResourceId::Variable { repo, name } => write!(f, "{}-variable-{}", repo, name),
            ResourceId::Secret { repo, name } => write!(f, "{}-secret-{}", repo, name),
            ResourceId::EnvironmentVariable {
                repo,
                environment,
                name,
            }
            | ResourceId::EnvironmentSecret {
                repo,
                environment,
                name,
            } => write!(f, "{}-env-{}-{}", repo, environment, name),
        }
    }
}

/// A resource together with the resources that must exist before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub id: ResourceId,
    pub depends_on: Vec<ResourceId>,
}

impl ResourceNode {
    pub fn new(id: ResourceId, depends_on: Vec<ResourceId>) -> Self {
        Self { id, depends_on }
    }

    /// A resource with no ordering constraints.
    pub fn root(id: ResourceId) -> Self {
        Self::new(id, Vec::new())
    }
}
