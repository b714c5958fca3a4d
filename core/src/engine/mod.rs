mod processor;
pub mod runtime;


pub use processor::ActivityEngine;
pub use runtime::{RuntimeSettings, run};
