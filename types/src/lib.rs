//! Shared configuration types for rankline.

mod config;
pub mod formatting;

pub use config::{EngineConfig, RankTierConfig, default_ranks};
