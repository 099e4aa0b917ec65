//! Branch protection rules and the builder that derives them.

use crate::config::TEAM_ADMIN;
use crate::error::Result;
use crate::overrides::OverrideStore;
use crate::repository::Repository;
use crate::resource::ResourceId;
use crate::team::{TeamIdentity, TeamRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor allowed to bypass pull request requirements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BypassActor {
    Team { identity: TeamIdentity },
    /// Organization owner, addressed as `/{login}`.
    OrgOwner { login: String },
}

impl fmt::Display for BypassActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassActor::Team { identity } => write!(f, "{}", identity),
            BypassActor::OrgOwner { login } => write!(f, "/{}", login),
        }
    }
}

/// Branch protection rule for a repository.
///
/// Rules enforce process gates (status checks, conversation resolution,
/// restricted pushes) rather than a mandatory number of approvals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchProtection {
    /// Repository name.
    pub repo: String,
    /// Branch pattern (e.g., "production/*").
    pub pattern: String,
    /// Allow branch deletion.
    pub allows_deletions: bool,
    /// Apply the rule to admins too.
    pub enforce_admins: bool,
    /// Require every review conversation to be resolved before merging.
    pub require_conversation_resolution: bool,
    /// Teams allowed to push to matching branches.
    pub push_allowances: Vec<TeamIdentity>,
    /// Block branch creation for actors without push allowance.
    pub blocks_creations: bool,
    /// Required status checks that must pass.
    pub required_status_checks: Vec<String>,
    /// Require branches to be up to date before merging.
    pub strict_status_checks: bool,
    /// Dismiss stale reviews when new commits are pushed.
    pub dismiss_stale_reviews: bool,
    /// Minimum number of approving reviews required.
    pub required_approving_review_count: u32,
    pub pull_request_bypassers: Vec<BypassActor>,
    pub force_push_bypassers: Vec<TeamIdentity>,
}

impl BranchProtection {
    /// Create a rule with the organization's fixed settings and empty actor lists.
    pub fn new(
        repo: impl Into<String>,
        pattern: impl Into<String>,
        allows_deletions: bool,
    ) -> Self {
        Self {
            repo: repo.into(),
            pattern: pattern.into(),
            allows_deletions,
            enforce_admins: true,
            require_conversation_resolution: true,
            push_allowances: Vec::new(),
            blocks_creations: false,
            required_status_checks: Vec::new(),
            strict_status_checks: false,
            dismiss_stale_reviews: true,
            required_approving_review_count: 0,
            pull_request_bypassers: Vec::new(),
            force_push_bypassers: Vec::new(),
        }
    }

    /// Check if this rule matches a branch name.
    ///
    /// `*` matches any run of characters, including `/`.
    pub fn matches(&self, branch: &str) -> bool {
        let parts: Vec<&str> = self.pattern.split('*').collect();
        let Some((first, rest)) = parts.split_first() else {
            return false;
        };
        if !branch.starts_with(first) {
            return false;
        }
        if rest.is_empty() {
            // No wildcard
            return branch == self.pattern;
        }

        let mut pos = first.len();
        for (i, part) in rest.iter().enumerate() {
            if i == rest.len() - 1 {
                return branch.len() >= pos + part.len() && branch.ends_with(part);
            }
            match branch[pos..].find(part) {
                Some(idx) => pos += idx + part.len(),
                None => return false,
            }
        }
        true
    }

    /// Check if a team may push to branches covered by this rule.
    pub fn allows_push_from(&self, team: &str) -> bool {
        self.push_allowances.iter().any(|identity| identity.team == team)
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::BranchProtection {
            repo: self.repo.clone(),
            pattern: self.pattern.clone(),
        }
    }

    /// The repository, then every team the rule references.
    pub fn dependencies(&self) -> Vec<ResourceId> {
        let pr_teams = self.pull_request_bypassers.iter().filter_map(|actor| match actor {
            BypassActor::Team { identity } => Some(identity),
            BypassActor::OrgOwner { .. } => None,
        });
        let referenced = self
            .push_allowances
            .iter()
            .chain(pr_teams)
            .chain(&self.force_push_bypassers);

        let mut deps = vec![ResourceId::Repository {
            repo: self.repo.clone(),
        }];
        for identity in referenced {
            let team = ResourceId::Team {
                team: identity.team.clone(),
            };
            if !deps.contains(&team) {
                deps.push(team);
            }
        }
        deps
    }
}

/// Derives branch protection rules from the team registry and override store.
///
/// Organization-owner pull request bypass is available through
/// [`with_owner_bypass`](Self::with_owner_bypass) and is off by default.
#[derive(Debug, Clone)]
pub struct BranchProtectionPolicyBuilder<'a> {
    org: &'a str,
    registry: &'a TeamRegistry,
    default_teams: &'a [String],
    store: &'a OverrideStore,
    owner_bypass: Option<String>,
}

impl<'a> BranchProtectionPolicyBuilder<'a> {
    pub fn new(
        org: &'a str,
        registry: &'a TeamRegistry,
        default_teams: &'a [String],
        store: &'a OverrideStore,
    ) -> Self {
        Self {
            org,
            registry,
            default_teams,
            store,
            owner_bypass: None,
        }
    }

    /// Let the organization owner bypass pull request requirements.
    pub fn with_owner_bypass(mut self, owner: impl Into<String>) -> Self {
        self.owner_bypass = Some(owner.into());
        self
    }

    fn identity(&self, team: &str) -> Result<TeamIdentity> {
        Ok(self.registry.require(team)?.identity(self.org))
    }

    /// Default teams followed by teams granted on the repository, without duplicates.
    pub fn push_allowances(&self, repo: &Repository) -> Result<Vec<TeamIdentity>> {
        let mut identities: Vec<TeamIdentity> = Vec::new();
        let granted = repo.teams.keys();

        for team in self.default_teams.iter().chain(granted) {
            let identity = self.identity(team)?;
            if !identities.contains(&identity) {
                identities.push(identity);
            }
        }

        Ok(identities)
    }

    pub fn pull_request_bypassers(&self) -> Result<Vec<BypassActor>> {
        let mut bypassers = Vec::new();
        if let Some(owner) = &self.owner_bypass {
            bypassers.push(BypassActor::OrgOwner {
                login: owner.clone(),
            });
        }
        bypassers.push(BypassActor::Team {
            identity: self.identity(TEAM_ADMIN)?,
        });
        Ok(bypassers)
    }

    pub fn force_push_bypassers(&self) -> Result<Vec<TeamIdentity>> {
        Ok(vec![self.identity(TEAM_ADMIN)?])
    }

    /// Build one rule for `pattern` requiring `status_checks`.
    pub fn build(
        &self,
        repo: &Repository,
        pattern: &str,
        allows_deletions: bool,
        status_checks: Vec<String>,
    ) -> Result<BranchProtection> {
        let mut rule = BranchProtection::new(repo.name.clone(), pattern, allows_deletions);
        rule.push_allowances = self.push_allowances(repo)?;
        rule.required_status_checks = status_checks;
        rule.pull_request_bypassers = self.pull_request_bypassers()?;
        rule.force_push_bypassers = self.force_push_bypassers()?;
        Ok(rule)
    }

    /// One deletable `{env}/*` rule per environment of the repository.
    pub fn environment_rules(&self, repo: &Repository) -> Result<Vec<BranchProtection>> {
        repo.environments
            .keys()
            .map(|env| {
                let checks = self.store.required_checks(&repo.name, env);
                self.build(repo, &format!("{}/*", env), true, checks)
            })
            .collect()
    }
}
