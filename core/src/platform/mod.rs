//! Boundary to the community platform.
//!
//! Every method here is a suspension point: the call leaves the process and
//! other events may be processed before it resumes. Callers must re-read
//! counters after awaiting rather than reuse values captured before the call.

pub mod memory;

use crate::ids::{GuildId, RoleId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub use memory::{InMemoryPlatform, PlatformFixture};

/// An invite code and its usage count as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteUsage {
    pub code: String,
    pub uses: u64,
    #[serde(default)]
    pub inviter_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} rejected: missing permissions")]
    Forbidden { operation: &'static str },
}

#[async_trait]
pub trait GuildPlatform: Send + Sync {
    /// Current invite list, in platform order.
    async fn fetch_invites(&self, guild: GuildId) -> Result<Vec<InviteUsage>, PlatformError>;

    async fn find_role_by_name(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<Role>, PlatformError>;

    /// Roles currently held by a member, or `None` if the member is unknown.
    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<Vec<Role>>, PlatformError>;

    async fn add_role(&self, guild: GuildId, user: UserId, role: &Role)
    -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: &Role,
    ) -> Result<(), PlatformError>;
}

#[async_trait]
impl<T: GuildPlatform + ?Sized> GuildPlatform for Arc<T> {
    async fn fetch_invites(&self, guild: GuildId) -> Result<Vec<InviteUsage>, PlatformError> {
        (**self).fetch_invites(guild).await
    }

    async fn find_role_by_name(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<Role>, PlatformError> {
        (**self).find_role_by_name(guild, name).await
    }

    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<Vec<Role>>, PlatformError> {
        (**self).member_roles(guild, user).await
    }

    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: &Role,
    ) -> Result<(), PlatformError> {
        (**self).add_role(guild, user, role).await
    }

    async fn remove_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: &Role,
    ) -> Result<(), PlatformError> {
        (**self).remove_role(guild, user, role).await
    }
}
