//! Global defaults and per-repository overrides.
//!
//! Every collection holds unscoped (global) entries and entries scoped to a
//! single repository. Resolving for a repository starts from the globals and
//! overlays that repository's entries, so a scoped entry always wins over a
//! global entry of the same name.

use crate::config::WILDCARD_SCOPE;
use crate::deferred::Deferred;
use crate::webhook::Hook;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of plain value held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Variable,
    Secret,
}

/// Branch or environment name to required check identifiers.
pub type StatusChecks = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scoped<T> {
    global: BTreeMap<String, T>,
    repos: BTreeMap<String, BTreeMap<String, T>>,
}

impl<T> Default for Scoped<T> {
    fn default() -> Self {
        Self {
            global: BTreeMap::new(),
            repos: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Scoped<T> {
    fn insert(&mut self, name: String, value: T, repo: Option<&str>) {
        match repo {
            Some(repo) => {
                self.repos
                    .entry(repo.to_string())
                    .or_default()
                    .insert(name, value);
            }
            None => {
                self.global.insert(name, value);
            }
        }
    }

    fn resolve(&self, repo: &str) -> BTreeMap<String, T> {
        let mut effective = self.global.clone();
        if let Some(scoped) = self.repos.get(repo) {
            effective.extend(scoped.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        effective
    }
}

/// Override collections consumed by the repository resolver.
///
/// The store is populated first and then only read during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideStore {
    variables: Scoped<Deferred>,
    secrets: Scoped<Deferred>,
    webhooks: Scoped<Hook>,
    environment_values: BTreeMap<(ValueKind, String), Scoped<Deferred>>,
    /// Keyed by repository name or [`WILDCARD_SCOPE`].
    status_checks: BTreeMap<String, StatusChecks>,
    deployment_branches: BTreeMap<String, Vec<String>>,
}

impl OverrideStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn values_mut(&mut self, kind: ValueKind) -> &mut Scoped<Deferred> {
        match kind {
            ValueKind::Variable => &mut self.variables,
            ValueKind::Secret => &mut self.secrets,
        }
    }

    fn values(&self, kind: ValueKind) -> &Scoped<Deferred> {
        match kind {
            ValueKind::Variable => &self.variables,
            ValueKind::Secret => &self.secrets,
        }
    }

    // ==================== Variables & Secrets ====================

    /// Store a value globally (`repo` is `None`) or for one repository.
    pub fn add(
        &mut self,
        kind: ValueKind,
        name: impl Into<String>,
        value: impl Into<Deferred>,
        repo: Option<&str>,
    ) {
        self.values_mut(kind).insert(name.into(), value.into(), repo);
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Deferred>,
        repo: Option<&str>,
    ) {
        self.add(ValueKind::Variable, name, value, repo);
    }

    pub fn add_variables<I, K, V>(&mut self, variables: I, repo: Option<&str>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Deferred>,
    {
        for (name, value) in variables {
            self.add_variable(name, value, repo);
        }
    }

    pub fn add_secret(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Deferred>,
        repo: Option<&str>,
    ) {
        self.add(ValueKind::Secret, name, value, repo);
    }

    pub fn add_secrets<I, K, V>(&mut self, secrets: I, repo: Option<&str>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Deferred>,
    {
        for (name, value) in secrets {
            self.add_secret(name, value, repo);
        }
    }

    /// Effective values of `kind` for a repository.
    pub fn resolve(&self, kind: ValueKind, repo: &str) -> BTreeMap<String, Deferred> {
        self.values(kind).resolve(repo)
    }

    // ==================== Environment-scoped values ====================

    /// Store a value for one environment, globally or for one repository.
    pub fn add_environment_value(
        &mut self,
        kind: ValueKind,
        environment: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Deferred>,
        repo: Option<&str>,
    ) {
        self.environment_values
            .entry((kind, environment.into()))
            .or_default()
            .insert(name.into(), value.into(), repo);
    }

    pub fn add_environment_variable(
        &mut self,
        environment: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Deferred>,
        repo: Option<&str>,
    ) {
        self.add_environment_value(ValueKind::Variable, environment, name, value, repo);
    }

    pub fn add_environment_secret(
        &mut self,
        environment: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Deferred>,
        repo: Option<&str>,
    ) {
        self.add_environment_value(ValueKind::Secret, environment, name, value, repo);
    }

    /// Effective environment-scoped values of `kind` for a repository environment.
    pub fn resolve_environment(
        &self,
        kind: ValueKind,
        repo: &str,
        environment: &str,
    ) -> BTreeMap<String, Deferred> {
        self.environment_values
            .get(&(kind, environment.to_string()))
            .map(|scoped| scoped.resolve(repo))
            .unwrap_or_default()
    }

    // ==================== Webhooks ====================

    pub fn add_webhook<I, S>(
        &mut self,
        name: impl Into<String>,
        url: impl Into<Deferred>,
        events: I,
        repo: Option<&str>,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.webhooks.insert(name.into(), Hook::new(url, events), repo);
    }

    /// Effective webhooks for a repository.
    pub fn resolve_webhooks(&self, repo: &str) -> BTreeMap<String, Hook> {
        self.webhooks.resolve(repo)
    }

    // ==================== Status checks ====================

    /// Require `checks` on a branch or environment, for one repository or for
    /// every repository lacking its own status checks.
    pub fn add_status_checks<I, S>(
        &mut self,
        branch: impl Into<String>,
        checks: I,
        repo: Option<&str>,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scope = repo.unwrap_or(WILDCARD_SCOPE).to_string();
        self.status_checks
            .entry(scope)
            .or_default()
            .insert(branch.into(), checks.into_iter().map(Into::into).collect());
    }

    /// Status-check set governing a repository.
    ///
    /// A repository's own set replaces the wildcard set entirely.
    pub fn status_checks_for(&self, repo: &str) -> Option<&StatusChecks> {
        self.status_checks
            .get(repo)
            .or_else(|| self.status_checks.get(WILDCARD_SCOPE))
    }

    /// Required checks for one branch or environment of a repository.
    pub fn required_checks(&self, repo: &str, branch: &str) -> Vec<String> {
        self.status_checks_for(repo)
            .and_then(|checks| checks.get(branch))
            .cloned()
            .unwrap_or_default()
    }

    // ==================== Deployment branches ====================

    /// Register the branch patterns allowed to deploy to `environment`.
    pub fn add_deployment_branches<I, S>(&mut self, environment: impl Into<String>, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deployment_branches.insert(
            environment.into(),
            patterns.into_iter().map(Into::into).collect(),
        );
    }

    /// Registered patterns for an environment, if any were registered.
    pub fn deployment_branches(&self, environment: &str) -> Option<&[String]> {
        self.deployment_branches.get(environment).map(Vec::as_slice)
    }
}
