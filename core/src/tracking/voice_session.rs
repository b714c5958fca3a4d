use crate::ids::{ChannelId, GuildId};
use chrono::{DateTime, Utc};

pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// Presence of one user in a voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSession {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    /// End of the span already folded into `carryover_millis` or credited.
    pub last_update: DateTime<Utc>,
    /// Sub-minute remainder not yet credited.
    pub carryover_millis: u64,
}

impl VoiceSession {
    pub fn new(guild_id: GuildId, channel_id: ChannelId, now: DateTime<Utc>) -> Self {
        Self {
            guild_id,
            channel_id,
            last_update: now,
            carryover_millis: 0,
        }
    }

    /// Fold the time since the last pass into the session and return the whole
    /// minutes to credit. The sub-minute remainder stays in `carryover_millis`.
    ///
    /// A clock that moved backwards contributes nothing.
    pub fn accrue(&mut self, now: DateTime<Utc>) -> u64 {
        let delta = now
            .signed_duration_since(self.last_update)
            .num_milliseconds()
            .max(0) as u64;
        let elapsed = delta + self.carryover_millis;
        let whole_minutes = elapsed / MILLIS_PER_MINUTE;

        if now > self.last_update {
            self.last_update = now;
        }
        self.carryover_millis = elapsed - whole_minutes * MILLIS_PER_MINUTE;
        whole_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_accrue_keeps_remainder() {
        let mut session = VoiceSession::new(GuildId(1), ChannelId(5), t0());
        assert_eq!(session.accrue(t0() + Duration::seconds(90)), 1);
        assert_eq!(session.carryover_millis, 30_000);
        assert_eq!(session.last_update, t0() + Duration::seconds(90));
    }

    #[test]
    fn test_sub_minute_pass_absorbs_time() {
        let mut session = VoiceSession::new(GuildId(1), ChannelId(5), t0());
        assert_eq!(session.accrue(t0() + Duration::seconds(40)), 0);
        assert_eq!(session.carryover_millis, 40_000);
        assert_eq!(session.accrue(t0() + Duration::seconds(80)), 1);
        assert_eq!(session.carryover_millis, 20_000);
    }

    #[test]
    fn test_clock_regression_adds_nothing() {
        let mut session = VoiceSession::new(GuildId(1), ChannelId(5), t0());
        session.carryover_millis = 10_000;
        assert_eq!(session.accrue(t0() - Duration::seconds(30)), 0);
        assert_eq!(session.carryover_millis, 10_000);
        assert_eq!(session.last_update, t0());
    }
}
