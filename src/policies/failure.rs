//! # Failure policy for callback reports.
//!
//! A start callback reports how many items of its batch failed. The contract
//! says the count is within `0..=batch_size`, but nothing forces the callback to
//! honor it. [`FailurePolicy`] decides what the runner does with a report.
//!
//! - [`FailurePolicy::Trust`] — only "zero or not" matters; the magnitude is ignored.
//! - [`FailurePolicy::Strict`] — a count larger than the batch is a caller bug and
//!   ends the run with [`SlowStartError::FailuresOutOfRange`].

use crate::batch::Batch;
use crate::error::SlowStartError;

/// Policy controlling validation of reported failure counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Trust the callback.
    ///
    /// Any nonzero count aborts the run; out-of-range counts are not detected.
    #[default]
    Trust,

    /// Reject counts greater than the batch size.
    ///
    /// Use when:
    /// - Debugging a callback's accounting
    /// - Tests that should fail loudly on bookkeeping bugs
    Strict,
}

impl FailurePolicy {
    /// Checks a failure count reported for `batch`.
    ///
    /// # Example
    /// ```rust
    /// use slowstart::{Batch, FailurePolicy};
    ///
    /// let batch = Batch::new(4, 3);
    /// assert!(FailurePolicy::Trust.check(batch, 9).is_ok());
    /// assert!(FailurePolicy::Strict.check(batch, 4).is_ok());
    /// assert!(FailurePolicy::Strict.check(batch, 5).is_err());
    /// ```
    pub fn check(&self, batch: Batch, failures: usize) -> Result<(), SlowStartError> {
        match self {
            FailurePolicy::Trust => Ok(()),
            FailurePolicy::Strict if failures > batch.size => {
                Err(SlowStartError::FailuresOutOfRange {
                    batch_size: batch.size,
                    pos: batch.pos,
                    failures,
                })
            }
            FailurePolicy::Strict => Ok(()),
        }
    }
}
