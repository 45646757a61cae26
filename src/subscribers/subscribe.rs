//! # Subscriber trait
//!
//! A [`Subscribe`] implementation observes slow-start runs: record skipped
//! counts as metrics, emit an object event when a run aborts, write a log
//! line per batch. It is fed by its own worker and bounded queue inside a
//! [`SubscriberSet`](crate::SubscriberSet), so a slow subscriber never delays
//! a run or another subscriber.
//!
//! ## Batch detail
//! A run of `n` items publishes about `3 * log2(n)` batch events but only two
//! run events. Subscribers that care about outcomes alone return `false` from
//! [`Subscribe::batch_events`] and never have batch events queued for them.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use slowstart::{Event, EventKind, Subscribe};
//!
//! struct AbortCounter;
//!
//! #[async_trait]
//! impl Subscribe for AbortCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RunAborted {
//!             // record ev.skipped...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "abort-counter" }
//!     fn batch_events(&self) -> bool { false }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of run, batch and delivery events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Panics are caught and reported as `SubscriberPanicked`.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue; events beyond it are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Whether per-batch progress events (`BatchStarting`, `BatchSucceeded`,
    /// `BatchFailed`) are delivered.
    fn batch_events(&self) -> bool {
        true
    }
}
