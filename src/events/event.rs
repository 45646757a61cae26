//! # Runtime events emitted by the slow-start runner.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: a run starting, completing, or aborting
//! - **Batch events**: one callback invocation starting, succeeding, or failing
//! - **Subscriber events**: delivery problems inside the [`SubscriberSet`](crate::SubscriberSet)
//!
//! The [`Event`] struct carries the metadata: run name, batch size and offset,
//! failure and skip counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use slowstart::{Batch, Event, EventKind};
//!
//! let ev = Event::new(EventKind::BatchFailed)
//!     .with_name("replicaset/web")
//!     .with_batch(Batch::new(4, 3))
//!     .with_failures(1)
//!     .with_skipped(493);
//!
//! assert_eq!(ev.kind, EventKind::BatchFailed);
//! assert_eq!(ev.name.as_deref(), Some("replicaset/web"));
//! assert_eq!(ev.batch(), Some(Batch::new(4, 3)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::batch::Batch;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Run events ===
    /// A run is starting.
    ///
    /// Sets:
    /// - `name`: run name (if configured)
    /// - `requested`: total items requested
    RunStarting,

    /// Every requested item was attempted and no batch failed.
    ///
    /// Sets:
    /// - `name`: run name
    /// - `requested`, `attempted` (equal)
    RunCompleted,

    /// A batch failed; the rest of the items were skipped.
    ///
    /// Sets:
    /// - `name`: run name
    /// - `requested`, `attempted`, `skipped`
    RunAborted,

    // === Batch events ===
    /// A batch is about to be handed to the start callback.
    ///
    /// Sets:
    /// - `name`: run name
    /// - `batch_size`, `pos`
    BatchStarting,

    /// The callback reported zero failures for the batch.
    ///
    /// Sets:
    /// - `name`: run name
    /// - `batch_size`, `pos`
    BatchSucceeded,

    /// The callback reported at least one failure for the batch.
    ///
    /// Sets:
    /// - `name`: run name
    /// - `batch_size`, `pos`
    /// - `failures`: count reported by the callback
    /// - `skipped`: items that will never be attempted in this run
    BatchFailed,

    /// The callback reported more failures than the batch holds
    /// (only detected under `FailurePolicy::Strict`).
    ///
    /// Sets:
    /// - `name`: run name
    /// - `batch_size`, `pos`, `failures`
    /// - `reason`: error message
    ContractViolated,
}

impl EventKind {
    /// Run-level event: a run starting or ending (`ContractViolated` ends it too).
    #[inline]
    pub fn is_run(self) -> bool {
        matches!(self, EventKind::RunStarting) || self.is_terminal()
    }

    /// Per-batch progress event (`BatchStarting`, `BatchSucceeded`, `BatchFailed`).
    #[inline]
    pub fn is_batch(self) -> bool {
        matches!(
            self,
            EventKind::BatchStarting | EventKind::BatchSucceeded | EventKind::BatchFailed
        )
    }

    /// Delivery report from a [`SubscriberSet`](crate::SubscriberSet).
    #[inline]
    pub fn is_subscriber(self) -> bool {
        matches!(
            self,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }

    /// Last event a run publishes: `RunCompleted`, `RunAborted`, or
    /// `ContractViolated` (the run then returns an error).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventKind::RunCompleted | EventKind::RunAborted | EventKind::ContractViolated
        )
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Run name (or subscriber name for subscriber events).
    pub name: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,

    /// Total items requested by the run.
    pub requested: Option<usize>,
    /// Items attempted so far.
    pub attempted: Option<usize>,
    /// Items that will never be attempted in this run.
    pub skipped: Option<usize>,
    /// Size of the batch.
    pub batch_size: Option<usize>,
    /// Offset of the batch.
    pub pos: Option<usize>,
    /// Failure count reported by the callback.
    pub failures: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            name: None,
            reason: None,
            requested: None,
            attempted: None,
            skipped: None,
            batch_size: None,
            pos: None,
            failures: None,
        }
    }

    /// Attaches a run (or subscriber) name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an optional run name; `None` leaves the event unnamed.
    #[inline]
    pub(crate) fn with_name_opt(mut self, name: Option<&Arc<str>>) -> Self {
        self.name = name.cloned();
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the requested total.
    #[inline]
    pub fn with_requested(mut self, n: usize) -> Self {
        self.requested = Some(n);
        self
    }

    /// Attaches the attempted count.
    #[inline]
    pub fn with_attempted(mut self, n: usize) -> Self {
        self.attempted = Some(n);
        self
    }

    /// Attaches the skipped count.
    #[inline]
    pub fn with_skipped(mut self, n: usize) -> Self {
        self.skipped = Some(n);
        self
    }

    /// Attaches batch size and offset.
    #[inline]
    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batch_size = Some(batch.size);
        self.pos = Some(batch.pos);
        self
    }

    /// Attaches the reported failure count.
    #[inline]
    pub fn with_failures(mut self, n: usize) -> Self {
        self.failures = Some(n);
        self
    }

    /// Returns the batch this event refers to, if any.
    pub fn batch(&self) -> Option<Batch> {
        match (self.batch_size, self.pos) {
            (Some(size), Some(pos)) => Some(Batch::new(size, pos)),
            _ => None,
        }
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_name(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
