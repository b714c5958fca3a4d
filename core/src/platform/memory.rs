//! In-process platform used by the replay driver and tests.
//!
//! Records every role mutation so callers can check how many boundary writes
//! an operation issued.

use super::{GuildPlatform, InviteUsage, PlatformError, Role};
use crate::ids::{GuildId, RoleId, UserId};
use async_trait::async_trait;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMutation {
    pub guild: GuildId,
    pub user: UserId,
    pub role: String,
    pub kind: MutationKind,
}

/// Declarative guild setup, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformFixture {
    #[serde(default)]
    pub guilds: Vec<GuildFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildFixture {
    pub id: GuildId,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(default)]
    pub invites: Vec<InviteUsage>,
}

#[derive(Debug, Default)]
struct GuildState {
    roles: Vec<Role>,
    members: HashMap<UserId, Vec<RoleId>>,
    invites: Vec<InviteUsage>,
}

#[derive(Debug, Default)]
struct Inner {
    guilds: HashMap<GuildId, GuildState>,
    mutations: Vec<RoleMutation>,
    next_role_id: u64,
    invites_unavailable: bool,
    reject_role_mutations: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    inner: Mutex<Inner>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: &PlatformFixture) -> Self {
        let platform = Self::new();
        for guild in &fixture.guilds {
            platform.add_guild(guild.id);
            for name in &guild.roles {
                platform.define_role(guild.id, name);
            }
            for member in &guild.members {
                platform.add_member(guild.id, *member);
            }
            platform.set_invites(guild.id, guild.invites.clone());
        }
        platform
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Setup ---

    pub fn add_guild(&self, guild: GuildId) {
        self.lock().guilds.entry(guild).or_default();
    }

    pub fn guild_ids(&self) -> Vec<GuildId> {
        let mut ids: Vec<GuildId> = self.lock().guilds.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Create a role (or return the existing one with that name).
    pub fn define_role(&self, guild: GuildId, name: &str) -> Role {
        let mut inner = self.lock();
        inner.next_role_id += 1;
        let next_id = RoleId(inner.next_role_id);
        let state = inner.guilds.entry(guild).or_default();
        if let Some(existing) = state.roles.iter().find(|r| r.name == name) {
            return existing.clone();
        }
        let role = Role {
            id: next_id,
            name: name.to_string(),
        };
        state.roles.push(role.clone());
        role
    }

    pub fn add_member(&self, guild: GuildId, user: UserId) {
        self.lock()
            .guilds
            .entry(guild)
            .or_default()
            .members
            .entry(user)
            .or_default();
    }

    /// Give a member a role directly, bypassing the mutation log.
    pub fn grant_role(&self, guild: GuildId, user: UserId, name: &str) -> bool {
        let mut inner = self.lock();
        let Some(state) = inner.guilds.get_mut(&guild) else {
            return false;
        };
        let Some(role_id) = state.roles.iter().find(|r| r.name == name).map(|r| r.id) else {
            return false;
        };
        let held = state.members.entry(user).or_default();
        if !held.contains(&role_id) {
            held.push(role_id);
        }
        true
    }

    pub fn set_invites(&self, guild: GuildId, invites: Vec<InviteUsage>) {
        self.lock().guilds.entry(guild).or_default().invites = invites;
    }

    /// Bump an invite's use count, as if someone joined through it.
    pub fn record_invite_use(&self, guild: GuildId, code: &str) -> bool {
        let mut inner = self.lock();
        let Some(invite) = inner
            .guilds
            .get_mut(&guild)
            .and_then(|state| state.invites.iter_mut().find(|i| i.code == code))
        else {
            return false;
        };
        invite.uses += 1;
        true
    }

    pub fn fail_invite_fetches(&self, fail: bool) {
        self.lock().invites_unavailable = fail;
    }

    pub fn reject_role_mutations(&self, reject: bool) {
        self.lock().reject_role_mutations = reject;
    }

    // --- Inspection ---

    pub fn member_role_names(&self, guild: GuildId, user: UserId) -> Vec<String> {
        let inner = self.lock();
        let Some(state) = inner.guilds.get(&guild) else {
            return Vec::new();
        };
        let Some(held) = state.members.get(&user) else {
            return Vec::new();
        };
        state
            .roles
            .iter()
            .filter(|r| held.contains(&r.id))
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn mutations(&self) -> Vec<RoleMutation> {
        self.lock().mutations.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.lock().mutations.len()
    }

    fn mutate(
        &self,
        operation: &'static str,
        guild: GuildId,
        user: UserId,
        role: &Role,
        kind: MutationKind,
    ) -> Result<(), PlatformError> {
        let mut inner = self.lock();
        if inner.reject_role_mutations {
            return Err(PlatformError::Forbidden { operation });
        }
        let held = inner
            .guilds
            .get_mut(&guild)
            .and_then(|state| state.members.get_mut(&user))
            .ok_or_else(|| PlatformError::Request {
                operation,
                message: format!("unknown member {user} in guild {guild}"),
            })?;
        match kind {
            MutationKind::Added if !held.contains(&role.id) => held.push(role.id),
            MutationKind::Removed => held.retain(|id| *id != role.id),
            _ => {}
        }
        inner.mutations.push(RoleMutation {
            guild,
            user,
            role: role.name.clone(),
            kind,
        });
        Ok(())
    }
}

#[async_trait]
impl GuildPlatform for InMemoryPlatform {
    async fn fetch_invites(&self, guild: GuildId) -> Result<Vec<InviteUsage>, PlatformError> {
        let inner = self.lock();
        if inner.invites_unavailable {
            return Err(PlatformError::Request {
                operation: "fetch_invites",
                message: "invite list unavailable".to_string(),
            });
        }
        Ok(inner
            .guilds
            .get(&guild)
            .map(|state| state.invites.clone())
            .unwrap_or_default())
    }

    async fn find_role_by_name(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<Role>, PlatformError> {
        Ok(self
            .lock()
            .guilds
            .get(&guild)
            .and_then(|state| state.roles.iter().find(|r| r.name == name).cloned()))
    }

    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<Vec<Role>>, PlatformError> {
        let inner = self.lock();
        let Some(state) = inner.guilds.get(&guild) else {
            return Ok(None);
        };
        Ok(state.members.get(&user).map(|held| {
            state
                .roles
                .iter()
                .filter(|r| held.contains(&r.id))
                .cloned()
                .collect()
        }))
    }

    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: &Role,
    ) -> Result<(), PlatformError> {
        self.mutate("add_role", guild, user, role, MutationKind::Added)
    }

    async fn remove_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: &Role,
    ) -> Result<(), PlatformError> {
        self.mutate("remove_role", guild, user, role, MutationKind::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: GuildId = GuildId(1);
    const ALICE: UserId = UserId(10);

    #[tokio::test]
    async fn test_fixture_round_trip_through_json() {
        let json = r#"{
            "guilds": [{
                "id": 1,
                "roles": ["Bronze", "Silver"],
                "members": [10],
                "invites": [{"code": "abc", "uses": 4, "inviter_id": 10}]
            }]
        }"#;
        let fixture: PlatformFixture = serde_json::from_str(json).unwrap();
        let platform = InMemoryPlatform::from_fixture(&fixture);

        assert_eq!(platform.guild_ids(), vec![GUILD]);
        let invites = platform.fetch_invites(GUILD).await.unwrap();
        assert_eq!(invites[0].uses, 4);
        assert_eq!(invites[0].inviter_id, Some(ALICE));
        assert!(platform.find_role_by_name(GUILD, "Silver").await.unwrap().is_some());
        assert_eq!(platform.member_roles(GUILD, ALICE).await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_role_mutations_are_logged() {
        let platform = InMemoryPlatform::new();
        let role = platform.define_role(GUILD, "Bronze");
        platform.add_member(GUILD, ALICE);

        platform.add_role(GUILD, ALICE, &role).await.unwrap();
        assert_eq!(platform.member_role_names(GUILD, ALICE), vec!["Bronze"]);
        platform.remove_role(GUILD, ALICE, &role).await.unwrap();
        assert!(platform.member_role_names(GUILD, ALICE).is_empty());

        let kinds: Vec<MutationKind> = platform.mutations().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MutationKind::Added, MutationKind::Removed]);
    }

    #[tokio::test]
    async fn test_unknown_member_is_none() {
        let platform = InMemoryPlatform::new();
        platform.add_guild(GUILD);
        assert_eq!(platform.member_roles(GUILD, ALICE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let platform = InMemoryPlatform::new();
        let role = platform.define_role(GUILD, "Bronze");
        platform.add_member(GUILD, ALICE);

        platform.fail_invite_fetches(true);
        assert!(platform.fetch_invites(GUILD).await.is_err());

        platform.reject_role_mutations(true);
        assert!(platform.add_role(GUILD, ALICE, &role).await.is_err());
        assert_eq!(platform.mutation_count(), 0);
    }

    #[test]
    fn test_record_invite_use() {
        let platform = InMemoryPlatform::new();
        platform.set_invites(
            GUILD,
            vec![InviteUsage {
                code: "abc".to_string(),
                uses: 1,
                inviter_id: None,
            }],
        );
        assert!(platform.record_invite_use(GUILD, "abc"));
        assert!(!platform.record_invite_use(GUILD, "zzz"));
    }
}
