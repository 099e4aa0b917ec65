//! Deployment environments owned by a repository.

use crate::deferred::Deferred;
use crate::resource::{ResourceId, ResourceNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A deployment environment of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    /// Owning repository name.
    pub repo: String,
    /// Source branch patterns allowed to deploy here, in registration order.
    pub deployment_policies: Vec<String>,
    /// Environment-scoped variables, additive to the repository ones.
    pub variables: BTreeMap<String, Deferred>,
    /// Environment-scoped secrets, additive to the repository ones.
    pub secrets: BTreeMap<String, Deferred>,
}

impl Environment {
    pub fn new(repo: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            deployment_policies: Vec::new(),
            variables: BTreeMap::new(),
            secrets: BTreeMap::new(),
        }
    }

    /// Allow deployments from branches matching `pattern`.
    ///
    /// Returns false if the pattern was already allowed.
    pub fn add_deployment_policy(&mut self, pattern: impl Into<String>) -> bool {
        let pattern = pattern.into();
        if self.deployment_policies.contains(&pattern) {
            return false;
        }
        self.deployment_policies.push(pattern);
        true
    }

    pub fn allows_pattern(&self, pattern: &str) -> bool {
        self.deployment_policies.iter().any(|p| p == pattern)
    }

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

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::Environment {
            repo: self.repo.clone(),
            environment: self.name.clone(),
        }
    }

    /// The environment itself depends on its repository.
    pub fn dependencies(&self) -> Vec<ResourceId> {
        vec![ResourceId::Repository {
            repo: self.repo.clone(),
        }]
    }

    /// Policies, variables and secrets depend on the environment.
    pub fn child_dependencies(&self) -> Vec<ResourceId> {
        vec![self.resource_id()]
    }

    /// Identifiers of every deployment policy of this environment.
    pub fn policy_resource_ids(&self) -> Vec<ResourceId> {
        self.deployment_policies
            .iter()
            .map(|pattern| ResourceId::DeploymentPolicy {
                repo: self.repo.clone(),
                environment: self.name.clone(),
                pattern: pattern.clone(),
            })
            .collect()
    }

    /// Identifiers of every environment-scoped variable and secret.
    pub fn value_resource_ids(&self) -> Vec<ResourceId> {
        let variables = self.variables.keys().map(|name| ResourceId::EnvironmentVariable {
            repo: self.repo.clone(),
            environment: self.name.clone(),
            name: name.clone(),
        });
        let secrets = self.secrets.keys().map(|name| ResourceId::EnvironmentSecret {
            repo: self.repo.clone(),
            environment: self.name.clone(),
            name: name.clone(),
        });
        variables.chain(secrets).collect()
    }

    /// The environment followed by everything attached to it.
    pub fn resource_nodes(&self) -> Vec<ResourceNode> {
        let mut nodes = vec![ResourceNode::new(self.resource_id(), self.dependencies())];
        nodes.extend(
            self.policy_resource_ids()
                .into_iter()
                .chain(self.value_resource_ids())
                .map(|id| ResourceNode::new(id, self.child_dependencies())),
        );
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_policies_keep_order() {
        let mut env = Environment::new("svc", "production");
        assert!(env.add_deployment_policy("release/*"));
        assert!(env.add_deployment_policy("*/*"));
        assert!(!env.add_deployment_policy("release/*"));

        assert_eq!(env.deployment_policies, vec!["release/*", "*/*"]);
        assert!(env.allows_pattern("*/*"));
        assert!(!env.allows_pattern("dev/*"));
        assert_eq!(env.policy_resource_ids().len(), 2);
    }

    #[test]
    fn test_dependencies() {
        let env = Environment::new("svc", "sandbox");
        assert_eq!(
            env.dependencies(),
            vec![ResourceId::Repository { repo: "svc".into() }]
        );
        assert_eq!(env.child_dependencies(), vec![env.resource_id()]);
    }

    #[test]
    fn test_scoped_values() {
        let mut env = Environment::new("svc", "sandbox");
        env.add_variable("REGION", "eu-west-1");
        env.add_secret("TOKEN", Deferred::pending("token.value"));

        assert_eq!(env.variables["REGION"], Deferred::from("eu-west-1"));
        assert!(env.secrets["TOKEN"].is_pending());
    }

    #[test]
    fn test_resource_nodes() {
        let mut env = Environment::new("svc", "production");
        env.add_deployment_policy("release/*");
        env.add_variable("URL", "https://prod");
        env.add_secret("TOKEN", "t");

        let nodes = env.resource_nodes();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].id, env.resource_id());
        assert_eq!(nodes[0].depends_on, env.dependencies());
        assert!(nodes[1..]
            .iter()
            .all(|node| node.depends_on == vec![env.resource_id()]));
        assert!(nodes.iter().any(|node| node.id
            == ResourceId::EnvironmentSecret {
                repo: "svc".into(),
                environment: "production".into(),
                name: "TOKEN".into(),
            }));
    }
}
