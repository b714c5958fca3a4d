use crate::ids::{GuildId, UserId};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-guild, per-user activity counters.
///
/// Every field only ever grows; there is no decrement operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivityRecord {
    pub messages: u64,
    /// Whole minutes spent in voice channels.
    #[serde(rename = "voice")]
    pub voice_minutes: u64,
    pub invites: u64,
}

/// Immutable copy of the store, shaped `guild -> user -> record`.
pub type ActivitySnapshot = BTreeMap<GuildId, BTreeMap<UserId, UserActivityRecord>>;

/// Pure storage for activity counters.
/// The single writable source of truth; trackers only propose increments.
#[derive(Debug, Clone, Default)]
pub struct ActivityStore {
    guilds: HashMap<GuildId, HashMap<UserId, UserActivityRecord>>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ActivitySnapshot) -> Self {
        let guilds = snapshot
            .into_iter()
            .map(|(guild, users)| (guild, users.into_iter().collect()))
            .collect();
        Self { guilds }
    }

    // --- Reads ---

    /// Current counters for a user, registering a zeroed record on first access.
    pub fn get(&mut self, guild: GuildId, user: UserId) -> UserActivityRecord {
        *self.entry(guild, user)
    }

    /// Current counters without registering the key.
    pub fn peek(&self, guild: GuildId, user: UserId) -> Option<UserActivityRecord> {
        self.guilds.get(&guild)?.get(&user).copied()
    }

    pub fn contains(&self, guild: GuildId, user: UserId) -> bool {
        self.peek(guild, user).is_some()
    }

    /// Number of tracked (guild, user) records.
    pub fn len(&self) -> usize {
        self.guilds.values().map(|users| users.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Increments ---
    // Each returns the record as it stands after the write.

    pub fn increment_messages(&mut self, guild: GuildId, user: UserId) -> UserActivityRecord {
        let record = self.entry(guild, user);
        record.messages = record.messages.saturating_add(1);
        *record
    }

    pub fn increment_voice(
        &mut self,
        guild: GuildId,
        user: UserId,
        minutes: u64,
    ) -> UserActivityRecord {
        let record = self.entry(guild, user);
        record.voice_minutes = record.voice_minutes.saturating_add(minutes);
        *record
    }

    pub fn increment_invites(&mut self, guild: GuildId, user: UserId) -> UserActivityRecord {
        let record = self.entry(guild, user);
        record.invites = record.invites.saturating_add(1);
        *record
    }

    // --- Lifecycle ---

    /// Owned copy for serialization; later writes never touch it.
    pub fn snapshot(&self) -> ActivitySnapshot {
        self.guilds
            .iter()
            .map(|(guild, users)| {
                let users = users.iter().map(|(user, record)| (*user, *record)).collect();
                (*guild, users)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.guilds.clear();
    }

    fn entry(&mut self, guild: GuildId, user: UserId) -> &mut UserActivityRecord {
        self.guilds
            .entry(guild)
            .or_default()
            .entry(user)
            .or_default()
    }
}
