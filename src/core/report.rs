use crate::batch::Batch;

/// Outcome of one [`SlowStart`](crate::SlowStart) run.
///
/// `skipped` is the number the plain [`slow_start`](crate::slow_start) function
/// returns for the same inputs; the other fields say how the run got there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    /// Items requested.
    pub requested: usize,
    /// Items handed to the callback, including the failed batch.
    pub attempted: usize,
    /// Items never attempted.
    pub skipped: usize,
    /// Number of callback invocations.
    pub batches: usize,
    /// The batch that stopped the run, if any.
    pub failed: Option<Batch>,
    /// Failure count reported by the failed batch (`0` for complete runs).
    pub failures: usize,
}

impl Report {
    pub(crate) fn completed(requested: usize, batches: usize) -> Self {
        Self {
            requested,
            attempted: requested,
            skipped: 0,
            batches,
            failed: None,
            failures: 0,
        }
    }

    pub(crate) fn aborted(
        requested: usize,
        batches: usize,
        batch: Batch,
        failures: usize,
        skipped: usize,
    ) -> Self {
        Self {
            requested,
            attempted: batch.end(),
            skipped,
            batches,
            failed: Some(batch),
            failures,
        }
    }

    /// True if every requested item was attempted without a failed batch.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}
