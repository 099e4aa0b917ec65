//! Error types for the governance crate.

use thiserror::Error;

/// Errors that can occur while resolving the governance model.
///
/// Every variant aborts the resolution pass that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// Repository declaration is malformed (empty name, bad visibility, bad actions access).
    #[error("invalid repository '{repo}': {reason}")]
    InvalidRepository { repo: String, reason: String },

    /// Team member role is not one of the supported roles.
    #[error("invalid role '{role}' for member '{username}' of team '{team}'")]
    InvalidRole {
        team: String,
        username: String,
        role: String,
    },

    /// Team permission is not one of the supported permissions.
    #[error("invalid permission '{permission}' for team '{team}'")]
    InvalidPermission { team: String, permission: String },

    /// A referenced team is not in the registry.
    #[error("team not found: {0}")]
    TeamNotFound(String),

    /// An environment was declared without registered deployment branches.
    #[error("branch patterns not found for environment: {0}")]
    MissingBranchPolicy(String),

    /// A DNS declaration references an undeclared zone.
    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    /// A DNS record declaration is malformed.
    #[error("invalid record '{name}' in zone '{zone}': {reason}")]
    InvalidRecord {
        zone: String,
        name: String,
        reason: String,
    },

    /// Configuration could not be parsed or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for governance operations.
pub type Result<T> = std::result::Result<T, GovernanceError>;
