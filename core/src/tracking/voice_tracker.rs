//! Voice presence state machine.
//!
//! Each user is either absent or present in exactly one channel:
//! - Absent -> Present: a session starts with no carryover
//! - Present -> Present (other channel): accrue, then move the session
//! - Present -> Absent: accrue, then drop the session and its remainder
//!
//! Accrual passes run on a timer and before every switch or leave, so the
//! same millisecond is never credited twice and sub-minute remainders survive
//! ticks and channel switches.

use super::voice_session::VoiceSession;
use crate::ids::{ChannelId, GuildId, UserId};
use crate::state::ActivityStore;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A user's voice state moving from one channel (or none) to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateChange {
    pub user_id: UserId,
    pub guild_id: GuildId,
    #[serde(default)]
    pub previous_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub new_channel_id: Option<ChannelId>,
}

/// Whole minutes credited to a user by one accrual pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceCredit {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub minutes: u64,
    /// Voice total after the credit.
    pub total_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceTransition {
    Joined {
        channel_id: ChannelId,
    },
    Switched {
        from: ChannelId,
        to: ChannelId,
    },
    Left {
        channel_id: ChannelId,
        /// Uncredited remainder dropped with the session.
        discarded_millis: u64,
    },
    /// Mute/deafen updates, leaves without a session, and similar.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceUpdate {
    pub transition: VoiceTransition,
    pub credit: Option<VoiceCredit>,
}

#[derive(Debug, Default)]
pub struct VoiceSessionTracker {
    sessions: HashMap<UserId, VoiceSession>,
}

impl VoiceSessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, user: UserId) -> Option<&VoiceSession> {
        self.sessions.get(&user)
    }

    pub fn is_present(&self, user: UserId) -> bool {
        self.sessions.contains_key(&user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Apply a voice state change, crediting any time owed before the session moves or ends.
    pub fn handle_state_change(
        &mut self,
        store: &mut ActivityStore,
        change: &VoiceStateChange,
        now: DateTime<Utc>,
    ) -> VoiceUpdate {
        let user = change.user_id;

        match (change.previous_channel_id, change.new_channel_id) {
            (None, Some(channel)) => {
                // A join while a session exists means a leave was missed.
                let credit = self.accrue_user(store, user, now);
                self.sessions
                    .insert(user, VoiceSession::new(change.guild_id, channel, now));
                VoiceUpdate {
                    transition: VoiceTransition::Joined {
                        channel_id: channel,
                    },
                    credit,
                }
            }

            (Some(_), _) if self.in_other_guild(change) => VoiceUpdate {
                transition: VoiceTransition::Unchanged,
                credit: None,
            },

            (Some(from), Some(to)) if from != to => {
                let credit = self.accrue_user(store, user, now);
                match self.sessions.get_mut(&user) {
                    Some(session) => {
                        session.channel_id = to;
                        VoiceUpdate {
                            transition: VoiceTransition::Switched { from, to },
                            credit,
                        }
                    }
                    None => {
                        // Already in a channel before tracking began.
                        self.sessions
                            .insert(user, VoiceSession::new(change.guild_id, to, now));
                        VoiceUpdate {
                            transition: VoiceTransition::Joined { channel_id: to },
                            credit,
                        }
                    }
                }
            }

            (Some(_), None) => {
                let credit = self.accrue_user(store, user, now);
                match self.sessions.remove(&user) {
                    Some(session) => VoiceUpdate {
                        transition: VoiceTransition::Left {
                            channel_id: session.channel_id,
                            discarded_millis: session.carryover_millis,
                        },
                        credit,
                    },
                    None => VoiceUpdate {
                        transition: VoiceTransition::Unchanged,
                        credit,
                    },
                }
            }

            _ => VoiceUpdate {
                transition: VoiceTransition::Unchanged,
                credit: None,
            },
        }
    }

    /// Periodic accrual pass over every open session.
    pub fn accrue_all(&mut self, store: &mut ActivityStore, now: DateTime<Utc>) -> Vec<VoiceCredit> {
        self.sessions
            .iter_mut()
            .filter_map(|(user, session)| credit_session(store, *user, session, now))
            .collect()
    }

    /// Forced accrual pass for one user.
    pub fn accrue_user(
        &mut self,
        store: &mut ActivityStore,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Option<VoiceCredit> {
        let session = self.sessions.get_mut(&user)?;
        credit_session(store, user, session, now)
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    /// The user's open session belongs to a different guild than the change.
    /// Moving between guilds can deliver the new guild's join first.
    fn in_other_guild(&self, change: &VoiceStateChange) -> bool {
        self.sessions
            .get(&change.user_id)
            .is_some_and(|session| session.guild_id != change.guild_id)
    }
}

fn credit_session(
    store: &mut ActivityStore,
    user: UserId,
    session: &mut VoiceSession,
    now: DateTime<Utc>,
) -> Option<VoiceCredit> {
    let minutes = session.accrue(now);
    if minutes == 0 {
        return None;
    }
    let record = store.increment_voice(session.guild_id, user, minutes);
    tracing::debug!(
        guild = %session.guild_id,
        %user,
        minutes,
        total = record.voice_minutes,
        "Credited voice time"
    );
    Some(VoiceCredit {
        guild_id: session.guild_id,
        user_id: user,
        minutes,
        total_minutes: record.voice_minutes,
    })
}
