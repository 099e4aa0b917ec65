//! Repository entities.

use crate::branch_protection::BranchProtection;
use crate::deferred::Deferred;
use crate::environment::Environment;
use crate::permission::Permission;
use crate::resource::{ResourceId, ResourceNode};
use crate::webhook::{Hook, Webhook};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Repository visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Parse from the exact configuration spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// A fully resolved repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    /// Repositories are always created with vulnerability alerts on.
    pub vulnerability_alerts: bool,
    /// Team name to granted permission.
    pub teams: BTreeMap<String, Permission>,
    pub environments: BTreeMap<String, Environment>,
    pub variables: BTreeMap<String, Deferred>,
    pub secrets: BTreeMap<String, Deferred>,
    pub webhooks: BTreeMap<String, Webhook>,
    /// Branch pattern to rule.
    pub branch_protections: BTreeMap<String, BranchProtection>,
    /// Whether workflows of this repository are shared with the organization.
    pub shared_workflow_access: bool,
}

impl Repository {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            visibility,
            vulnerability_alerts: true,
            teams: BTreeMap::new(),
            environments: BTreeMap::new(),
            variables: BTreeMap::new(),
            secrets: BTreeMap::new(),
            webhooks: BTreeMap::new(),
            branch_protections: BTreeMap::new(),
            shared_workflow_access: false,
        }
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::Repository {
            repo: self.name.clone(),
        }
    }

    /// Everything attached to the repository depends on it.
    pub fn dependencies(&self) -> Vec<ResourceId> {
        vec![self.resource_id()]
    }

    // ==================== Teams ====================

    /// Grant a team, replacing any previous grant.
    pub fn add_team(&mut self, name: impl Into<String>, permission: Permission) {
        self.teams.insert(name.into(), permission);
    }

    pub fn add_teams(&mut self, teams: BTreeMap<String, Permission>) {
        self.teams.extend(teams);
    }

    pub fn team_permission(&self, name: &str) -> Option<Permission> {
        self.teams.get(name).copied()
    }

    /// A grant depends on both the repository and the team.
    pub fn team_grant_dependencies(&self, team: &str) -> Vec<ResourceId> {
        vec![
            self.resource_id(),
            ResourceId::Team {
                team: team.to_string(),
            },
        ]
    }

    // ==================== Environments ====================

    /// Add an environment, replacing one of the same name.
    pub fn add_environment(&mut self, name: impl Into<String>) -> &mut Environment {
        let name = name.into();
        let env = Environment::new(self.name.clone(), name.clone());
        match self.environments.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(env);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(env),
        }
    }

    pub fn has_environments(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.environments.contains_key(*name))
    }

    // ==================== Values ====================

    pub fn add_variable(&mut self, name: impl Into<String>, value: impl Into<Deferred>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn add_variables(&mut self, variables: BTreeMap<String, Deferred>) {
        self.variables.extend(variables);
    }

    pub fn add_secret(&mut self, name: impl Into<String>, value: impl Into<Deferred>) {
        self.secrets.insert(name.into(), value.into());
    }

    pub fn add_secrets(&mut self, secrets: BTreeMap<String, Deferred>) {
        self.secrets.extend(secrets);
    }

    // ==================== Webhooks & Protection ====================

    pub fn add_webhook(&mut self, name: impl Into<String>, hook: Hook) {
        let name = name.into();
        let webhook = Webhook::new(self.name.clone(), name.clone(), hook);
        self.webhooks.insert(name, webhook);
    }

    pub fn add_branch_protection(&mut self, rule: BranchProtection) {
        self.branch_protections.insert(rule.pattern.clone(), rule);
    }

    /// First rule covering a branch, in pattern order.
    pub fn find_branch_protection(&self, branch: &str) -> Option<&BranchProtection> {
        self.branch_protections.values().find(|rule| rule.matches(branch))
    }

    /// Share this repository's workflows with the organization. Idempotent.
    pub fn enable_shared_workflows(&mut self) {
        self.shared_workflow_access = true;
    }

    /// Every resource this repository expands into, with ordering edges.
    pub fn resource_nodes(&self) -> Vec<ResourceNode> {
        let mut nodes = vec![ResourceNode::root(self.resource_id())];

        nodes.extend(self.teams.keys().map(|team| {
            let id = ResourceId::TeamGrant {
                repo: self.name.clone(),
                team: team.clone(),
            };
            ResourceNode::new(id, self.team_grant_dependencies(team))
        }));

        let variables = self.variables.keys().map(|name| ResourceId::Variable {
            repo: self.name.clone(),
            name: name.clone(),
        });
        let secrets = self.secrets.keys().map(|name| ResourceId::Secret {
            repo: self.name.clone(),
            name: name.clone(),
        });
        nodes.extend(
            variables
                .chain(secrets)
                .map(|id| ResourceNode::new(id, self.dependencies())),
        );

        for env in self.environments.values() {
            nodes.extend(env.resource_nodes());
        }
        nodes.extend(
            self.webhooks
                .values()
                .map(|hook| ResourceNode::new(hook.resource_id(), hook.dependencies())),
        );
        nodes.extend(
            self.branch_protections
                .values()
                .map(|rule| ResourceNode::new(rule.resource_id(), rule.dependencies())),
        );
        if self.shared_workflow_access {
            let id = ResourceId::SharedWorkflowAccess {
                repo: self.name.clone(),
            };
            nodes.push(ResourceNode::new(id, self.dependencies()));
        }

        nodes
    }

    /// Identifiers of every resource this repository expands into.
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resource_nodes().into_iter().map(|node| node.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse() {
        assert_eq!(Visibility::parse("public"), Some(Visibility::Public));
        assert_eq!(Visibility::parse("private"), Some(Visibility::Private));
        assert_eq!(Visibility::parse("internal"), None);
        assert_eq!(Visibility::parse("Public"), None);
    }

    #[test]
    fn test_repository_creation() {
        let repo = Repository::new("svc", "A service", Visibility::Private);
        assert_eq!(repo.name, "svc");
        assert!(repo.vulnerability_alerts);
        assert!(!repo.shared_workflow_access);
        assert!(repo.teams.is_empty());
        assert_eq!(repo.resource_ids(), vec![repo.resource_id()]);
    }

    #[test]
    fn test_team_grants() {
        let mut repo = Repository::new("svc", "", Visibility::Public);
        repo.add_team("backend", Permission::Pull);
        repo.add_team("backend", Permission::Push);

        assert_eq!(repo.team_permission("backend"), Some(Permission::Push));
        assert_eq!(repo.team_permission("docs"), None);
        assert_eq!(
            repo.team_grant_dependencies("backend"),
            vec![
                ResourceId::Repository { repo: "svc".into() },
                ResourceId::Team {
                    team: "backend".into()
                },
            ]
        );
    }

    #[test]
    fn test_environments() {
        let mut repo = Repository::new("svc", "", Visibility::Public);
        repo.add_environment("sandbox").add_deployment_policy("dev/*");
        repo.add_environment("production");

        assert!(repo.has_environments(&["sandbox", "production"]));
        assert!(!repo.has_environments(&["staging"]));
        assert_eq!(repo.environments["sandbox"].repo, "svc");
        assert_eq!(repo.environments["sandbox"].deployment_policies, vec!["dev/*"]);
    }

    #[test]
    fn test_find_branch_protection() {
        let mut repo = Repository::new("svc", "", Visibility::Public);
        repo.add_branch_protection(BranchProtection::new("svc", "production/*", true));

        assert!(repo.find_branch_protection("production/v1").is_some());
        assert!(repo.find_branch_protection("main").is_none());
    }

    #[test]
    fn test_resource_nodes_cover_values() {
        let mut repo = Repository::new("svc", "", Visibility::Public);
        repo.add_team("admin", Permission::Admin);
        repo.add_variable("REGION", "eu-west-1");
        repo.add_secret("TOKEN", Deferred::pending("token.value"));
        repo.add_environment("production").add_variable("URL", "https://prod");

        let nodes = repo.resource_nodes();
        let names: Vec<String> = nodes.iter().map(|node| node.id.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "svc",
                "svc-teams-admin",
                "svc-variable-REGION",
                "svc-secret-TOKEN",
                "svc-env-production",
                "svc-env-production-URL",
            ]
        );

        let secret = &nodes[3];
        assert_eq!(secret.depends_on, repo.dependencies());
        let grant = &nodes[1];
        assert!(grant.depends_on.contains(&ResourceId::Team {
            team: "admin".into()
        }));
        let env_var = &nodes[5];
        assert_eq!(env_var.depends_on, vec![repo.environments["production"].resource_id()]);
    }

    #[test]
    fn test_shared_workflows_idempotent() {
        let mut repo = Repository::new("svc", "", Visibility::Public);
        repo.enable_shared_workflows();
        repo.enable_shared_workflows();

        let ids = repo.resource_ids();
        let count = ids
            .iter()
            .filter(|id| matches!(id, ResourceId::SharedWorkflowAccess { .. }))
            .count();
        assert_eq!(count, 1);
    }
}
