//! Keeps a member's rank role in line with their resolved rank.

use super::RankTable;
use crate::ids::{GuildId, UserId};
use crate::platform::{GuildPlatform, PlatformError, Role};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AssignError {
    #[error("role `{0}` not found in guild")]
    RoleNotFound(String),
    #[error("member {user} not found in guild {guild}")]
    MemberNotFound { guild: GuildId, user: UserId },
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Role changes issued by one [`RankAssigner::sync`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: Option<Role>,
    pub removed: Vec<Role>,
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        self.added.is_none() && self.removed.is_empty()
    }

    pub fn mutation_count(&self) -> usize {
        self.removed.len() + usize::from(self.added.is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankAssigner {
    rank_names: HashSet<String>,
}

impl RankAssigner {
    pub fn new(table: &RankTable) -> Self {
        Self {
            rank_names: table.tiers().iter().map(|t| t.name.clone()).collect(),
        }
    }

    /// Whether a role is one of the rank-tagged roles.
    pub fn is_rank_role(&self, name: &str) -> bool {
        self.rank_names.contains(name)
    }

    /// Make the member hold exactly the target rank role.
    ///
    /// Current membership is read before any write, so repeating a call with
    /// the same rank issues no further mutations. `None` leaves roles untouched.
    pub async fn sync<P: GuildPlatform + ?Sized>(
        &self,
        platform: &P,
        guild: GuildId,
        user: UserId,
        rank_name: Option<&str>,
    ) -> Result<SyncOutcome, AssignError> {
        let Some(rank_name) = rank_name else {
            return Ok(SyncOutcome::default());
        };

        let target = platform
            .find_role_by_name(guild, rank_name)
            .await?
            .ok_or_else(|| AssignError::RoleNotFound(rank_name.to_string()))?;

        let held = platform
            .member_roles(guild, user)
            .await?
            .ok_or(AssignError::MemberNotFound { guild, user })?;

        let mut outcome = SyncOutcome::default();

        for role in held
            .iter()
            .filter(|r| r.id != target.id && self.is_rank_role(&r.name))
        {
            platform.remove_role(guild, user, role).await?;
            tracing::info!(%guild, %user, role = %role.name, "Removed rank role");
            outcome.removed.push(role.clone());
        }

        if !held.iter().any(|r| r.id == target.id) {
            platform.add_role(guild, user, &target).await?;
            tracing::info!(%guild, %user, role = %target.name, "Granted rank role");
            outcome.added = Some(target);
        }

        Ok(outcome)
    }
}
