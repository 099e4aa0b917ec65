//! Webhook subscriptions attached to repositories.

use crate::deferred::Deferred;
use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};

/// A webhook declaration as stored in the override store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// Callback URL for webhook delivery.
    pub url: Deferred,
    /// Events that trigger this webhook (provider event names).
    pub events: Vec<String>,
}

impl Hook {
    pub fn new<I, S>(url: impl Into<Deferred>, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            events: events.into_iter().map(Into::into).collect(),
        }
    }
}

/// A webhook resolved for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    /// Hook name (unique per repository).
    pub name: String,
    /// Repository the hook belongs to.
    pub repo: String,
    pub url: Deferred,
    pub events: Vec<String>,
    /// Payload content type.
    pub content_type: String,
    /// Whether the webhook is active.
    pub active: bool,
}

impl Webhook {
    /// Create an active JSON webhook.
    pub fn new(repo: impl Into<String>, name: impl Into<String>, hook: Hook) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            url: hook.url,
            events: hook.events,
            content_type: "json".into(),
            active: true,
        }
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::Webhook {
            repo: self.repo.clone(),
            hook: self.name.clone(),
        }
    }

    pub fn dependencies(&self) -> Vec<ResourceId> {
        vec![ResourceId::Repository {
            repo: self.repo.clone(),
        }]
    }
}
