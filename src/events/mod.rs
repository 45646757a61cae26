//! Runner events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] broadcast channel shared by runs, [`RunWatch`] receiver for one named run
//!
//! ## Quick reference
//! - **Publishers**: `SlowStart` runs (run and batch events), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: `SubscriberSet::listen`, `bus.watch(name)` and any
//!   `bus.subscribe()` receiver.

mod bus;
mod event;

pub use bus::{Bus, RunWatch};
pub use event::{Event, EventKind};
