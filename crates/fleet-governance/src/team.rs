//! Team entities and the registry repositories resolve against.

use crate::config::DEFAULT_TEAMS;
use crate::deferred::Deferred;
use crate::error::{GovernanceError, Result};
use crate::permission::TeamRole;
use crate::resource::{ResourceId, ResourceNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A team within the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team name (unique within the organization).
    pub name: String,
    /// Optional description.
    pub description: String,
    /// Whether the team is granted on every repository.
    pub is_default: bool,
    /// Provider id, known once the team is materialized.
    pub id: Deferred,
    /// Provider slug, known once the team is materialized.
    pub slug: Deferred,
    /// Username to role.
    pub memberships: BTreeMap<String, TeamRole>,
}

impl Team {
    /// Create a team whose identifiers are still pending.
    pub fn new(name: impl Into<String>, is_default: bool) -> Self {
        let name = name.into();
        Self {
            id: Deferred::pending(format!("team-{}.id", name)),
            slug: Deferred::pending(format!("team-{}.slug", name)),
            description: String::new(),
            memberships: BTreeMap::new(),
            is_default,
            name,
        }
    }

    /// Set the team description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add or replace a member.
    pub fn add_member(&mut self, username: impl Into<String>, role: TeamRole) {
        self.memberships.insert(username.into(), role);
    }

    /// Check if a user is a member of this team.
    pub fn is_member(&self, username: &str) -> bool {
        self.memberships.contains_key(username)
    }

    /// Role of a member, if present.
    pub fn role_of(&self, username: &str) -> Option<TeamRole> {
        self.memberships.get(username).copied()
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::Team {
            team: self.name.clone(),
        }
    }

    /// Memberships depend on the team existing.
    pub fn membership_dependencies(&self) -> Vec<ResourceId> {
        vec![self.resource_id()]
    }

    /// The team followed by one node per membership.
    pub fn resource_nodes(&self) -> Vec<ResourceNode> {
        let mut nodes = vec![ResourceNode::root(self.resource_id())];
        nodes.extend(self.memberships.keys().map(|username| {
            let id = ResourceId::TeamMembership {
                team: self.name.clone(),
                username: username.clone(),
            };
            ResourceNode::new(id, self.membership_dependencies())
        }));
        nodes
    }

    /// Externally addressable identity of this team within `org`.
    pub fn identity(&self, org: &str) -> TeamIdentity {
        TeamIdentity {
            org: org.to_string(),
            team: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Team reference usable in push allowances and bypass lists (`org/slug`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub org: String,
    /// Registry name, kept so pending slugs can be traced back.
    pub team: String,
    pub slug: Deferred,
}

impl fmt::Display for TeamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.slug)
    }
}

/// Team identifiers as exported for other stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTeam {
    pub id: Deferred,
    pub slug: Deferred,
    pub is_default: bool,
}

/// All teams known to a resolution pass, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistry {
    teams: BTreeMap<String, Team>,
}

impl TeamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a team, returning the one it replaced.
    pub fn insert(&mut self, team: Team) -> Option<Team> {
        self.teams.insert(team.name.clone(), team)
    }

    pub fn get(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    /// Look up a team that must exist.
    pub fn require(&self, name: &str) -> Result<&Team> {
        self.teams
            .get(name)
            .ok_or_else(|| GovernanceError::TeamNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Teams flagged as default, in name order.
    pub fn default_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values().filter(|t| t.is_default)
    }

    /// Substitute concrete identifiers once the provider has created the team.
    pub fn bind_identity(
        &mut self,
        name: &str,
        id: impl Into<String>,
        slug: impl Into<String>,
    ) -> Result<()> {
        let team = self
            .teams
            .get_mut(name)
            .ok_or_else(|| GovernanceError::TeamNotFound(name.to_string()))?;
        team.id = Deferred::Known(id.into());
        team.slug = Deferred::Known(slug.into());
        Ok(())
    }

    /// Nodes of every team and membership, in name order.
    pub fn resource_nodes(&self) -> Vec<ResourceNode> {
        self.teams.values().flat_map(Team::resource_nodes).collect()
    }

    /// Identifiers of every team, for consumption by other stacks.
    pub fn export(&self) -> BTreeMap<String, ExportedTeam> {
        self.teams
            .iter()
            .map(|(name, team)| {
                (
                    name.clone(),
                    ExportedTeam {
                        id: team.id.clone(),
                        slug: team.slug.clone(),
                        is_default: team.is_default,
                    },
                )
            })
            .collect()
    }

    /// Rebuild a registry of the built-in default teams plus `names` from an export.
    ///
    /// Memberships are not part of an export, so the rebuilt teams have none.
    pub fn from_exported(
        exported: &BTreeMap<String, ExportedTeam>,
        names: &[String],
    ) -> Result<Self> {
        let mut registry = Self::new();
        let requested = DEFAULT_TEAMS
            .iter()
            .copied()
            .chain(names.iter().map(String::as_str));

        for name in requested {
            let entry = exported
                .get(name)
                .ok_or_else(|| GovernanceError::TeamNotFound(name.to_string()))?;
            let mut team = Team::new(name, entry.is_default);
            team.id = entry.id.clone();
            team.slug = entry.slug.clone();
            registry.insert(team);
        }

        Ok(registry)
    }
}
