//! Invite attribution by diffing usage counts.
//!
//! The platform does not say which invite a new member used. Instead the
//! detector keeps the last observed `code -> uses` map per guild and, on a
//! join, picks the first invite (in fetch order) whose count went up. Two
//! joins between fetches, or two joins racing on the same stale snapshot, can
//! misattribute; this is best effort, not a transactional guarantee.

use crate::ids::{GuildId, UserId};
use crate::platform::InviteUsage;
use hashbrown::HashMap;

pub type InviteSnapshot = HashMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteAttribution {
    pub code: String,
    pub inviter_id: Option<UserId>,
}

#[derive(Debug, Default)]
pub struct InviteUsageDetector {
    snapshots: HashMap<GuildId, InviteSnapshot>,
}

impl InviteUsageDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a guild's snapshot without attributing anything.
    pub fn prime(&mut self, guild: GuildId, invites: &[InviteUsage]) {
        self.snapshots.insert(guild, to_snapshot(invites));
    }

    /// Find the invite consumed since the last fetch, then replace the
    /// snapshot with `fetched` whether or not one was found.
    pub fn detect(&mut self, guild: GuildId, fetched: &[InviteUsage]) -> Option<InviteAttribution> {
        let used = {
            let previous = self.snapshots.get(&guild);
            fetched
                .iter()
                .find(|invite| {
                    let before = previous
                        .and_then(|snapshot| snapshot.get(&invite.code))
                        .copied()
                        .unwrap_or(0);
                    invite.uses > before
                })
                .map(|invite| InviteAttribution {
                    code: invite.code.clone(),
                    inviter_id: invite.inviter_id,
                })
        };

        self.snapshots.insert(guild, to_snapshot(fetched));
        used
    }

    pub fn snapshot(&self, guild: GuildId) -> Option<&InviteSnapshot> {
        self.snapshots.get(&guild)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

fn to_snapshot(invites: &[InviteUsage]) -> InviteSnapshot {
    invites
        .iter()
        .map(|invite| (invite.code.clone(), invite.uses))
        .collect()
}
