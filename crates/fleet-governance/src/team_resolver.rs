//! Builds the team registry from team declarations.

use crate::config::{TeamConfig, TeamMemberConfig};
use crate::error::{GovernanceError, Result};
use crate::permission::TeamRole;
use crate::team::{Team, TeamRegistry};
use tracing::{debug, info, warn};

/// Turns team declarations into a [`TeamRegistry`].
///
/// Default teams that are not declared are added as empty teams, so they
/// always exist in the registry.
#[derive(Debug, Clone)]
pub struct TeamResolver {
    teams: Vec<TeamConfig>,
    default_teams: Vec<String>,
}

impl TeamResolver {
    /// `default_teams` is the effective default list, see
    /// [`effective_default_teams`](crate::GovernanceSettings::effective_default_teams).
    pub fn new(mut teams: Vec<TeamConfig>, default_teams: Vec<String>) -> Self {
        for name in &default_teams {
            if !teams.iter().any(|cfg| &cfg.name == name) {
                teams.push(TeamConfig::empty(name.clone()));
            }
        }

        Self {
            teams,
            default_teams,
        }
    }

    /// Declarations after default teams were appended.
    pub fn teams(&self) -> &[TeamConfig] {
        &self.teams
    }

    /// Build the registry, validating every member role.
    pub fn load(&self) -> Result<TeamRegistry> {
        let mut registry = TeamRegistry::new();

        for cfg in &self.teams {
            let is_default = self.default_teams.contains(&cfg.name);
            let mut team = Team::new(cfg.name.clone(), is_default)
                .with_description(cfg.description.clone());

            Self::load_members(&mut team, &cfg.members)?;

            debug!(
                team = %team.name,
                members = team.memberships.len(),
                is_default,
                "resolved team"
            );
            if registry.insert(team).is_some() {
                warn!(
                    team = %cfg.name,
                    "team declared more than once, keeping the last declaration"
                );
            }
        }

        info!(teams = registry.len(), "team registry built");
        Ok(registry)
    }

    fn load_members(team: &mut Team, members: &[TeamMemberConfig]) -> Result<()> {
        for member in members {
            let role = TeamRole::parse(&member.role).ok_or_else(|| GovernanceError::InvalidRole {
                team: team.name.clone(),
                username: member.username.clone(),
                role: member.role.clone(),
            })?;
            team.add_member(member.username.clone(), role);
        }
        Ok(())
    }
}
