use crate::ids::{GuildId, UserId};
use crate::tracking::VoiceStateChange;
use serde::{Deserialize, Serialize};

/// Platform events consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    MessageReceived {
        guild_id: GuildId,
        user_id: UserId,
        #[serde(default)]
        is_from_automated_account: bool,
    },
    VoiceStateChanged(VoiceStateChange),
    MemberJoined {
        guild_id: GuildId,
        user_id: UserId,
    },
    /// Read-only progress query.
    RankCommandInvoked {
        guild_id: GuildId,
        user_id: UserId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChannelId;

    #[test]
    fn test_parse_message_event() {
        let json = r#"{"type":"message_received","guild_id":1,"user_id":10}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            InboundEvent::MessageReceived {
                guild_id: GuildId(1),
                user_id: UserId(10),
                is_from_automated_account: false,
            }
        );
    }

    #[test]
    fn test_parse_voice_event() {
        let json = r#"{"type":"voice_state_changed","guild_id":1,"user_id":10,"new_channel_id":5}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        let InboundEvent::VoiceStateChanged(change) = event else {
            panic!("expected a voice event");
        };
        assert_eq!(change.previous_channel_id, None);
        assert_eq!(change.new_channel_id, Some(ChannelId(5)));
        assert_eq!(change.guild_id, GuildId(1));
    }
}
