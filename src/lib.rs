//! # slowstart
//!
//! **slowstart** throttles bursts of identical operations (such as creating
//! the pods of a replica set) so that a systemic failure like a quota error is
//! discovered after a handful of attempts instead of after all of them.
//!
//! Items are started in batches of 1, 2, 4, 8, ... Each batch is handed to a
//! caller-supplied callback that reports how many of its items failed. The first
//! batch with a failure ends the run; the caller gets the number of items that
//! were never attempted and retries them later (typically on its next sync pass).
//!
//! ## Architecture
//! ```text
//!  to_start ──► SlowStart / slow_start
//!                   │
//!                   │  BatchCursor: pos, next size (GrowthPolicy), clamp
//!                   ▼
//!  ┌─────────────────────────────────────────────────────────────┐
//!  │ loop                                                        │
//!  │   batch = [pos .. pos + size)                               │
//!  │   failures = start(batch)   ◄── caller callback (may fan_out)│
//!  │   failures > 0 ─► Report { skipped = to_start - end, .. }   │
//!  │   else pos = end; size = min(size × 2, remaining)           │
//!  └───────────────────────────┬─────────────────────────────────┘
//!                              │ publish (optional)
//!                              ▼
//!                     Bus (broadcast channel)
//!                              │
//!                   SubscriberSet::listen
//!                   ┌──────────┼──────────┐
//!                   ▼          ▼          ▼
//!               RunTally   LogWriter   custom
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / functions                         |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------|
//! | **Algorithm**     | The bare doubling loop, returns the skipped count.           | [`slow_start`]                                |
//! | **Runner**        | Policies, events, structured reports, async callbacks.       | [`SlowStart`], [`Report`], [`StartBatch`]     |
//! | **Fan-out**       | Start one batch's items concurrently inside a callback.      | [`fan_out`], [`fan_out_cancellable`]          |
//! | **Policies**      | Batch growth and failure-report validation.                  | [`GrowthPolicy`], [`FailurePolicy`]           |
//! | **Events**        | Run and batch lifecycle events on a broadcast bus.           | [`Event`], [`Bus`], [`RunWatch`]              |
//! | **Subscriber API**| Hook into events (outcome tally, logging, custom).           | [`Subscribe`], [`SubscriberSet`], [`RunTally`]|
//! | **Errors**        | Typed error for strict validation.                           | [`SlowStartError`]                            |
//! | **Configuration** | Centralize runner settings.                                  | [`Config`]                                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use slowstart::slow_start;
//!
//! // The API server starts refusing after 20 creations (quota).
//! let quota = 20;
//! let mut created = 0;
//!
//! let skipped = slow_start(500, |batch_size, _pos| {
//!     let ok = batch_size.min(quota - created);
//!     created += ok;
//!     batch_size - ok
//! });
//!
//! // Batches 1, 2, 4, 8 succeed (15 items); the batch of 16 hits the quota.
//! assert_eq!(created, 20);
//! assert_eq!(skipped, 500 - 31);
//! ```
//!
//! ## Async example
//! ```rust
//! use slowstart::{Batch, Bus, SlowStart, fan_out};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = Bus::new(256);
//! let runner = SlowStart::default().with_bus(bus).with_name("rs/web");
//!
//! let report = runner
//!     .run_fn(10, |batch: Batch| async move {
//!         fan_out(batch, |_i| async { Ok::<_, String>(()) }).await.failures()
//!     })
//!     .await
//!     .unwrap();
//!
//! assert!(report.is_complete());
//! assert_eq!(report.batches, 4);
//! # }
//! ```
mod batch;
mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use batch::{Batch, BatchOutcome, StartBatch, StartFn, fan_out, fan_out_cancellable};
pub use config::Config;
pub use self::core::{Report, SlowStart, slow_start};
pub use error::SlowStartError;
pub use events::{Bus, Event, EventKind, RunWatch};
pub use policies::{FailurePolicy, GrowthPolicy};
pub use subscribers::{RunStats, RunTally, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
