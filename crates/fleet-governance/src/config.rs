//! Declarative configuration types and organization settings.
//!
//! Enumerated fields (roles, permissions, visibility) are kept as raw strings
//! here. The resolvers turn them into closed enums and report the domain
//! error for anything outside the supported set.

use crate::error::{GovernanceError, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Team that is granted admin on every repository.
pub const TEAM_ADMIN: &str = "admin";

/// Default teams every organization carries.
pub const DEFAULT_TEAMS: &[&str] = &[TEAM_ADMIN];

/// Staging environment name.
pub const ENV_SANDBOX: &str = "sandbox";

/// Production environment name.
pub const ENV_PRODUCTION: &str = "production";

/// Deployment pattern that opens an environment to every branch.
pub const WILDCARD_BRANCH_PATTERN: &str = "*/*";

/// Status-check scope applying to repositories without their own checks.
pub const WILDCARD_SCOPE: &str = "*";

/// A declared team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<TeamMemberConfig>,
}

impl TeamConfig {
    /// An empty team used to guarantee a default team exists.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            members: Vec::new(),
        }
    }

    /// Parse a YAML list of team declarations.
    pub fn parse_list(yaml: &str) -> Result<Vec<Self>> {
        serde_yaml::from_str(yaml).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}

/// A declared team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberConfig {
    pub username: String,
    /// Empty when omitted, rejected by the resolver like any unknown role.
    #[serde(default)]
    pub role: String,
}

/// A declared repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: String,
    /// `"org"` opts into organization-shared workflows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_access: Option<String>,
    #[serde(default)]
    pub teams: Vec<RepositoryTeamConfig>,
    /// `None` means the repository declares no environments at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<String>>,
}

impl RepositoryConfig {
    /// Parse a YAML list of repository declarations.
    pub fn parse_list(yaml: &str) -> Result<Vec<Self>> {
        serde_yaml::from_str(yaml).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}

/// A team grant declared on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTeamConfig {
    pub name: String,
    #[serde(default)]
    pub permission: String,
}

/// Organization-wide settings for a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GovernanceSettings {
    /// Organization login, prefix of every team identity.
    #[validate(length(min = 1))]
    pub org: String,
    /// Extra default teams, merged after the built-in ones.
    pub default_teams: Vec<String>,
    #[validate(length(min = 1))]
    pub sandbox_environment: String,
    #[validate(length(min = 1))]
    pub production_environment: String,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            org: String::new(),
            default_teams: Vec::new(),
            sandbox_environment: ENV_SANDBOX.to_string(),
            production_environment: ENV_PRODUCTION.to_string(),
        }
    }
}

impl GovernanceSettings {
    /// Settings for an organization with only the built-in default teams.
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            ..Self::default()
        }
    }

    /// Add extra default teams.
    pub fn with_default_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_teams.extend(teams.into_iter().map(Into::into));
        self
    }

    /// Parse settings from YAML and validate them.
    pub fn parse(yaml: &str) -> Result<Self> {
        let settings: Self =
            serde_yaml::from_str(yaml).map_err(|e| GovernanceError::Config(e.to_string()))?;
        settings.check()?;
        Ok(settings)
    }

    /// Validate field constraints.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Built-in default teams followed by the configured ones, without duplicates.
    pub fn effective_default_teams(&self) -> Vec<String> {
        let mut teams: Vec<String> = Vec::new();
        let configured = self.default_teams.iter().map(String::as_str);
        for name in DEFAULT_TEAMS.iter().copied().chain(configured) {
            if !teams.iter().any(|t| t == name) {
                teams.push(name.to_string());
            }
        }
        teams
    }
}
