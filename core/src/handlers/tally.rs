use crate::events::{ActivitySignal, SignalHandler};
use std::sync::{Arc, Mutex, PoisonError};

/// Running totals over every signal seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyCounts {
    pub messages: u64,
    pub voice_minutes: u64,
    pub voice_sessions_started: u64,
    pub voice_sessions_ended: u64,
    pub invites: u64,
    pub rank_changes: u64,
    pub snapshots: u64,
}

/// Counts signals as they are dispatched.
///
/// Clones share the same counts, so one clone can be registered with the
/// engine and another kept to read the totals afterwards.
#[derive(Debug, Clone, Default)]
pub struct SignalTally {
    counts: Arc<Mutex<TallyCounts>>,
}

impl SignalTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> TallyCounts {
        *self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SignalHandler for SignalTally {
    fn handle_signal(&mut self, signal: &ActivitySignal) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        match signal {
            ActivitySignal::MessageCounted { .. } => counts.messages += 1,
            ActivitySignal::VoiceCredited { minutes, .. } => counts.voice_minutes += minutes,
            ActivitySignal::VoiceSessionStarted { .. } => counts.voice_sessions_started += 1,
            ActivitySignal::VoiceSessionEnded { .. } => counts.voice_sessions_ended += 1,
            ActivitySignal::InviteAttributed { .. } => counts.invites += 1,
            ActivitySignal::RankChanged { .. } => counts.rank_changes += 1,
            ActivitySignal::SnapshotPersisted { .. } => counts.snapshots += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{GuildId, UserId};

    #[test]
    fn test_clones_share_counts() {
        let tally = SignalTally::new();
        let mut registered = tally.clone();

        registered.handle_signals(&[
            ActivitySignal::MessageCounted {
                guild_id: GuildId(1),
                user_id: UserId(10),
                total: 1,
            },
            ActivitySignal::VoiceCredited {
                guild_id: GuildId(1),
                user_id: UserId(10),
                minutes: 3,
                total: 3,
            },
            ActivitySignal::VoiceCredited {
                guild_id: GuildId(1),
                user_id: UserId(10),
                minutes: 2,
                total: 5,
            },
        ]);

        let counts = tally.counts();
        assert_eq!(counts.messages, 1);
        assert_eq!(counts.voice_minutes, 5);
        assert_eq!(counts.rank_changes, 0);
    }
}
