use crate::ids::{ChannelId, GuildId, UserId};
use chrono::{DateTime, Utc};

/// Signals emitted by the engine after it handles an event or a tick.
/// These describe what changed, for observers that want to react to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitySignal {
    MessageCounted {
        guild_id: GuildId,
        user_id: UserId,
        total: u64,
    },

    // Voice lifecycle
    VoiceSessionStarted {
        guild_id: GuildId,
        user_id: UserId,
        channel_id: ChannelId,
        timestamp: DateTime<Utc>,
    },
    VoiceSessionEnded {
        guild_id: GuildId,
        user_id: UserId,
        channel_id: ChannelId,
        discarded_millis: u64,
        timestamp: DateTime<Utc>,
    },
    VoiceCredited {
        guild_id: GuildId,
        user_id: UserId,
        minutes: u64,
        total: u64,
    },

    InviteAttributed {
        guild_id: GuildId,
        inviter_id: UserId,
        invitee_id: UserId,
        code: String,
    },

    /// A member's rank role was granted or replaced.
    RankChanged {
        guild_id: GuildId,
        user_id: UserId,
        rank: String,
        removed: Vec<String>,
    },

    SnapshotPersisted {
        records: usize,
        timestamp: DateTime<Utc>,
    },
}
