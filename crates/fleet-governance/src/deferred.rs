//! Two-phase values known only once an external system responds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value that is either concrete or a placeholder the provisioning layer fills in.
///
/// The resolver moves placeholders around but never looks inside them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Deferred {
    /// Concrete value.
    Known(String),
    /// Placeholder key, substituted after materialization.
    Pending(String),
}

impl Deferred {
    /// Create a placeholder.
    pub fn pending(key: impl Into<String>) -> Self {
        Deferred::Pending(key.into())
    }

    /// Returns the concrete value, if known.
    pub fn known(&self) -> Option<&str> {
        match self {
            Deferred::Known(v) => Some(v),
            Deferred::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Deferred::Pending(_))
    }
}

impl From<String> for Deferred {
    fn from(value: String) -> Self {
        Deferred::Known(value)
    }
}

impl From<&str> for Deferred {
    fn from(value: &str) -> Self {
        Deferred::Known(value.to_string())
    }
}

impl fmt::Display for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Known(v) => write!(f, "{}", v),
            Deferred::Pending(key) => write!(f, "${{{}}}", key),
        }
    }
}
