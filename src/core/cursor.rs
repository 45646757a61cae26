//! # BatchCursor: loop bookkeeping shared by every run.
//!
//! Tracks how far a run got and which batch comes next.
//!
//! ## Invariants
//! - Whenever [`next_batch`](BatchCursor::next_batch) returns a batch:
//!   `batch.pos < to_start` and `batch.end() <= to_start`.
//! - Batches are contiguous: after [`advance`](BatchCursor::advance), the next
//!   batch starts where the previous one ended.
//!
//! Because the clamp lives here and not in the callback, the skip count
//! `to_start - batch.size - batch.pos` can never underflow.

use crate::batch::Batch;
use crate::policies::GrowthPolicy;

#[derive(Debug, Clone)]
pub(crate) struct BatchCursor {
    to_start: usize,
    pos: usize,
    size: usize,
    growth: GrowthPolicy,
}

impl BatchCursor {
    pub(crate) fn new(to_start: usize, growth: GrowthPolicy) -> Self {
        Self {
            to_start,
            pos: 0,
            size: growth.first_size(to_start),
            growth,
        }
    }

    /// Total items requested.
    pub(crate) fn to_start(&self) -> usize {
        self.to_start
    }

    /// Items covered by fully successful batches so far.
    pub(crate) fn attempted(&self) -> usize {
        self.pos
    }

    /// The batch to issue next, or `None` once every item was attempted.
    pub(crate) fn next_batch(&self) -> Option<Batch> {
        (self.pos < self.to_start).then(|| Batch::new(self.size, self.pos))
    }

    /// Moves past a fully successful `batch` and sizes the next one.
    pub(crate) fn advance(&mut self, batch: Batch) {
        debug_assert_eq!(batch.pos, self.pos, "batches must be contiguous");
        self.pos = batch.end();
        self.size = self.growth.next(batch.size, self.to_start - self.pos);
    }

    /// Items never attempted when `batch` is the one that failed.
    pub(crate) fn skipped_after(&self, batch: Batch) -> usize {
        self.to_start - batch.size - batch.pos
    }
}
