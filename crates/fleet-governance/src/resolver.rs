//! Repository policy resolution.
//!
//! [`RepoPolicyResolver`] turns repository declarations into fully resolved
//! [`Repository`] entities: team grants, environments with deployment
//! policies, merged variables, secrets and webhooks, and branch protection.
//! The first error aborts the pass and no partial model is returned.

use crate::branch_protection::BranchProtectionPolicyBuilder;
use crate::config::{
    GovernanceSettings, RepositoryConfig, RepositoryTeamConfig, TeamConfig, TEAM_ADMIN,
    WILDCARD_BRANCH_PATTERN,
};
use crate::error::{GovernanceError, Result};
use crate::overrides::{OverrideStore, ValueKind};
use crate::permission::Permission;
use crate::repository::{Repository, Visibility};
use crate::resource::{ResourceId, ResourceNode};
use crate::team::TeamRegistry;
use crate::team_resolver::TeamResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Variable listing the declared environments as a JSON array.
pub const VAR_REPO_ENVIRONMENTS: &str = "REPO_ENVIRONMENTS";

/// Variable naming the environment pull requests are compared against.
pub const VAR_REPO_ENV_COMPARISON: &str = "REPO_ENV_COMPARISON";

/// `actions_access` value that shares workflows with the organization.
pub const ACTIONS_ACCESS_ORG: &str = "org";

/// The governance model handed to the provisioning layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModel {
    pub teams: TeamRegistry,
    pub repositories: BTreeMap<String, Repository>,
    /// Every resource with its ordering edges: teams first, then repositories by name.
    pub resources: Vec<ResourceNode>,
}

impl ResolvedModel {
    pub fn new(teams: TeamRegistry, repositories: BTreeMap<String, Repository>) -> Self {
        let mut resources = teams.resource_nodes();
        for repo in repositories.values() {
            resources.extend(repo.resource_nodes());
        }

        Self {
            teams,
            repositories,
            resources,
        }
    }

    pub fn repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.get(name)
    }

    /// Resources that must exist before `id`, or `None` for an unknown resource.
    pub fn dependencies_of(&self, id: &ResourceId) -> Option<&[ResourceId]> {
        self.resources
            .iter()
            .find(|node| &node.id == id)
            .map(|node| node.depends_on.as_slice())
    }

    /// Serialize the model as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GovernanceError::Serialization(e.to_string()))
    }
}

/// Resolves every declared repository against a team registry and override store.
#[derive(Debug)]
pub struct RepoPolicyResolver<'a> {
    settings: &'a GovernanceSettings,
    repositories: &'a [RepositoryConfig],
    registry: &'a TeamRegistry,
    store: &'a OverrideStore,
    default_teams: Vec<String>,
}

impl<'a> RepoPolicyResolver<'a> {
    /// Create a resolver, checking that every default team is registered.
    pub fn new(
        settings: &'a GovernanceSettings,
        repositories: &'a [RepositoryConfig],
        registry: &'a TeamRegistry,
        store: &'a OverrideStore,
    ) -> Result<Self> {
        let default_teams = settings.effective_default_teams();
        for team in &default_teams {
            if !registry.contains(team) {
                return Err(GovernanceError::TeamNotFound(team.clone()));
            }
        }

        Ok(Self {
            settings,
            repositories,
            registry,
            store,
            default_teams,
        })
    }

    fn protection_builder(&self) -> BranchProtectionPolicyBuilder<'_> {
        BranchProtectionPolicyBuilder::new(
            &self.settings.org,
            self.registry,
            &self.default_teams,
            self.store,
        )
    }

    /// Resolve every declared repository.
    pub fn load(&self) -> Result<ResolvedModel> {
        let mut repositories = BTreeMap::new();

        for cfg in self.repositories {
            let repo = self.resolve_repository(cfg)?;
            if repositories.insert(repo.name.clone(), repo).is_some() {
                warn!(
                    repo = %cfg.name,
                    "repository declared more than once, keeping the last declaration"
                );
            }
        }

        info!(
            org = %self.settings.org,
            repositories = repositories.len(),
            teams = self.registry.len(),
            "governance model resolved"
        );

        Ok(ResolvedModel::new(self.registry.clone(), repositories))
    }

    /// Resolve a single repository declaration.
    pub fn resolve_repository(&self, cfg: &RepositoryConfig) -> Result<Repository> {
        let mut repo = Self::new_repository(cfg)?;

        repo.add_teams(self.resolve_teams(cfg)?);

        if let Some(access) = &cfg.actions_access {
            if access != ACTIONS_ACCESS_ORG {
                return Err(GovernanceError::InvalidRepository {
                    repo: cfg.name.clone(),
                    reason: format!("invalid actions access: {}", access),
                });
            }
            repo.enable_shared_workflows();
        }

        self.resolve_environments(cfg, &mut repo)?;
        repo.add_variables(self.store.resolve(ValueKind::Variable, &repo.name));
        repo.add_secrets(self.store.resolve(ValueKind::Secret, &repo.name));

        for rule in self.protection_builder().environment_rules(&repo)? {
            repo.add_branch_protection(rule);
        }

        for (name, hook) in self.store.resolve_webhooks(&repo.name) {
            repo.add_webhook(name, hook);
        }

        debug!(
            repo = %repo.name,
            teams = repo.teams.len(),
            environments = repo.environments.len(),
            protections = repo.branch_protections.len(),
            "resolved repository"
        );
        Ok(repo)
    }

    fn new_repository(cfg: &RepositoryConfig) -> Result<Repository> {
        if cfg.name.is_empty() {
            return Err(GovernanceError::InvalidRepository {
                repo: cfg.name.clone(),
                reason: "empty repository name".into(),
            });
        }

        let visibility =
            Visibility::parse(&cfg.visibility).ok_or_else(|| GovernanceError::InvalidRepository {
                repo: cfg.name.clone(),
                reason: format!("invalid visibility: {}", cfg.visibility),
            })?;

        let description = cfg.description.clone().unwrap_or_default();
        Ok(Repository::new(cfg.name.clone(), description, visibility))
    }

    /// Declared grants plus every default team.
    ///
    /// The admin team always ends up with admin. Other default teams get at
    /// least maintain, keeping a higher declared permission.
    pub fn resolve_teams(&self, cfg: &RepositoryConfig) -> Result<BTreeMap<String, Permission>> {
        let mut teams = BTreeMap::new();

        for RepositoryTeamConfig { name, permission } in &cfg.teams {
            if !self.registry.contains(name) {
                return Err(GovernanceError::TeamNotFound(name.clone()));
            }
            let permission =
                Permission::parse(permission).ok_or_else(|| GovernanceError::InvalidPermission {
                    team: name.clone(),
                    permission: permission.clone(),
                })?;
            teams.insert(name.clone(), permission);
        }

        for team in &self.default_teams {
            if team == TEAM_ADMIN {
                teams.insert(team.clone(), Permission::Admin);
                continue;
            }
            let granted = teams.entry(team.clone()).or_insert(Permission::Maintain);
            *granted = (*granted).max(Permission::Maintain);
        }

        Ok(teams)
    }

    fn resolve_environments(&self, cfg: &RepositoryConfig, repo: &mut Repository) -> Result<()> {
        let Some(environments) = &cfg.environments else {
            return Ok(());
        };

        let listed = serde_json::to_string(environments)
            .map_err(|e| GovernanceError::Serialization(e.to_string()))?;
        repo.add_variable(VAR_REPO_ENVIRONMENTS, listed);

        let repo_name = repo.name.clone();
        let sandbox = &self.settings.sandbox_environment;
        let production = &self.settings.production_environment;
        let has_sandbox = environments.contains(sandbox);

        let comparison = if has_sandbox { sandbox } else { production };
        repo.add_variable(VAR_REPO_ENV_COMPARISON, comparison.as_str());

        for name in environments {
            let patterns = self
                .store
                .deployment_branches(name)
                .ok_or_else(|| GovernanceError::MissingBranchPolicy(name.clone()))?;

            let variables = self.store.resolve_environment(ValueKind::Variable, &repo_name, name);
            let secrets = self.store.resolve_environment(ValueKind::Secret, &repo_name, name);

            let env = repo.add_environment(name.clone());
            for pattern in patterns {
                env.add_deployment_policy(pattern.clone());
            }
            // Production stays deployable from any branch until a sandbox gate exists
            if name == production && !has_sandbox {
                env.add_deployment_policy(WILDCARD_BRANCH_PATTERN);
            }
            env.add_variables(variables);
            env.add_secrets(secrets);

            debug!(
                repo = %repo_name,
                environment = %name,
                policies = ?env.deployment_policies,
                "resolved environment"
            );
        }

        Ok(())
    }
}

/// Resolve teams and repositories in one pass.
pub fn resolve(
    settings: &GovernanceSettings,
    teams: Vec<TeamConfig>,
    repositories: &[RepositoryConfig],
    store: &OverrideStore,
) -> Result<ResolvedModel> {
    settings.check()?;
    let registry = TeamResolver::new(teams, settings.effective_default_teams()).load()?;
    RepoPolicyResolver::new(settings, repositories, &registry, store)?.load()
}
