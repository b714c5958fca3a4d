//! Activity and rank progression engine.
//!
//! Turns platform events into per-user activity counters and keeps each
//! member's rank role in line with those counters.

pub mod context;
pub mod engine;
pub mod events;
pub mod handlers;
pub mod ids;
pub mod platform;
pub mod ranks;
pub mod state;
pub mod storage;
pub mod tracking;

pub use context::{ConfigError, EngineConfigExt};
pub use engine::{ActivityEngine, RuntimeSettings};
pub use events::{ActivitySignal, InboundEvent, SignalHandler};
pub use ids::{ChannelId, GuildId, RoleId, UserId};
pub use platform::{GuildPlatform, InMemoryPlatform, PlatformError};
pub use ranks::{RankReport, RankTable, RankTier};
pub use state::{ActivitySnapshot, ActivityStore, UserActivityRecord};
pub use storage::{PersistError, PersistenceManager};
