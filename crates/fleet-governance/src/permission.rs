//! Permission levels and team roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission level a team holds on a repository.
///
/// Permissions are ordered: Pull < Push < Maintain < Admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Can read repository contents (clone, pull).
    Pull,
    /// Can read and push commits.
    Push,
    /// Can manage the repository without access to destructive settings.
    Maintain,
    /// Full control including settings and deletion.
    Admin,
}

impl Permission {
    /// Check if this permission level grants at least the required level.
    pub fn has(&self, required: Permission) -> bool {
        *self >= required
    }

    /// Parse from the exact configuration spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pull" => Some(Permission::Pull),
            "push" => Some(Permission::Push),
            "maintain" => Some(Permission::Maintain),
            "admin" => Some(Permission::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Pull => write!(f, "pull"),
            Permission::Push => write!(f, "push"),
            Permission::Maintain => write!(f, "maintain"),
            Permission::Admin => write!(f, "admin"),
        }
    }
}

/// Role of a member inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Regular team member.
    Member,
    /// Can manage team membership.
    Maintainer,
}

impl TeamRole {
    /// Parse from the exact configuration spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(TeamRole::Member),
            "maintainer" => Some(TeamRole::Maintainer),
            _ => None,
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamRole::Member => write!(f, "member"),
            TeamRole::Maintainer => write!(f, "maintainer"),
        }
    }
}
