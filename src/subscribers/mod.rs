//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! that fans events from a [`Bus`](crate::Bus) out to subscribers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   SlowStart ── publish(Event) ──► Bus ──► SubscriberSet::listen
//!                                              │
//!                                              ├──► Subscribe::on_event(&Event)
//!                                              │         │
//!                                              │    ┌────┴────┬─────────┐
//!                                              │    ▼         ▼         ▼
//!                                              │  RunTally  LogWriter  Custom
//! ```

mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use embedded::{RunStats, RunTally};
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
