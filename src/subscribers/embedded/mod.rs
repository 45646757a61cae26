//! # Built-in subscribers
//!
//! - [`RunTally`]: per-run-name outcome counters.
//! - [`LogWriter`]: prints events in a human-readable form (demo/debug, feature `logging`).

#[cfg(feature = "logging")]
mod log;
mod tally;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use tally::{RunStats, RunTally};
