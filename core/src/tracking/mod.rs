//! Activity trackers
//!
//! This module provides:
//! - **Voice sessions**: presence per user, accruing whole minutes on ticks
//!   and on session-ending transitions
//! - **Invite usage**: per-guild invite snapshots diffed on member joins
//!
//! Trackers never own counters. They propose increments into the
//! [`ActivityStore`](crate::state::ActivityStore).

mod invites;
mod voice_session;
mod voice_tracker;


pub use invites::{InviteAttribution, InviteSnapshot, InviteUsageDetector};
pub use voice_session::{MILLIS_PER_MINUTE, VoiceSession};
pub use voice_tracker::{
    VoiceCredit, VoiceSessionTracker, VoiceStateChange, VoiceTransition, VoiceUpdate,
};
