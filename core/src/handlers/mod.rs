//! Signal handlers that observe the engine.

mod tally;

pub use tally::{SignalTally, TallyCounts};
