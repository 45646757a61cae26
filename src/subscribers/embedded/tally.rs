//! # RunTally: outcome counters per run name
//!
//! Folds run events into [`RunStats`], keyed by the runner name (see
//! [`SlowStart::with_name`](crate::SlowStart::with_name)). A controller that
//! runs slow start once per sync pass can read how many items keep being
//! skipped for an object without wiring its own subscriber.
//!
//! ```text
//! RunStarting      → runs += 1, requested += n
//! RunCompleted     → completed += 1, attempted += n
//! RunAborted       → aborted += 1, attempted += n, skipped += n
//! ContractViolated → violations += 1
//! ```
//!
//! Batch events are never queued for it. Runs without a name are tallied
//! under `""`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Accumulated outcomes of every run seen under one name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Runs started.
    pub runs: usize,
    /// Runs that attempted every requested item.
    pub completed: usize,
    /// Runs stopped by a failing batch.
    pub aborted: usize,
    /// Runs stopped by an out-of-range failure report.
    pub violations: usize,
    /// Items requested, summed over runs.
    pub requested: usize,
    /// Items handed to callbacks, summed over finished runs.
    pub attempted: usize,
    /// Items never attempted, summed over aborted runs.
    pub skipped: usize,
}

impl RunStats {
    fn apply(&mut self, ev: &Event) {
        let n = |field: Option<usize>| field.unwrap_or(0);
        match ev.kind {
            EventKind::RunStarting => {
                self.runs += 1;
                self.requested += n(ev.requested);
            }
            EventKind::RunCompleted => {
                self.completed += 1;
                self.attempted += n(ev.attempted);
            }
            EventKind::RunAborted => {
                self.aborted += 1;
                self.attempted += n(ev.attempted);
                self.skipped += n(ev.skipped);
            }
            EventKind::ContractViolated => self.violations += 1,
            _ => {}
        }
    }
}

/// Subscriber keeping [`RunStats`] per run name.
pub struct RunTally {
    inner: RwLock<HashMap<String, RunStats>>,
    capacity: usize,
}

impl RunTally {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: 256,
        }
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Stats for the run named `name`, if any of its runs started.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RunStats> {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        g.get(name).cloned()
    }

    /// All stats, sorted by run name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, RunStats)> {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut v: Vec<_> = g.iter().map(|(k, s)| (k.clone(), s.clone())).collect();
        v.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        v
    }
}

impl Default for RunTally {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for RunTally {
    async fn on_event(&self, ev: &Event) {
        if !ev.kind.is_run() {
            return;
        }
        let name = ev.name.as_deref().unwrap_or("");
        let mut g = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        g.entry(name.to_owned()).or_default().apply(ev);
    }

    fn name(&self) -> &'static str {
        "RunTally"
    }
    fn queue_capacity(&self) -> usize {
        self.capacity
    }
    fn batch_events(&self) -> bool {
        false
    }
}
