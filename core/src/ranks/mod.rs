//! Rank tiers, resolution, and role assignment.

mod assigner;
mod resolver;
mod table;

pub use assigner::{AssignError, RankAssigner, SyncOutcome};
pub use resolver::RankReport;
pub use table::{RankTable, RankTableError, RankTier};
