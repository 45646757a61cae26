//! Error types used by the slow-start runner.
//!
//! The batching algorithm itself has no error taxonomy: its outcome is the
//! number of skipped items. [`SlowStartError`] only covers runs configured to
//! validate callback reports (see [`FailurePolicy::Strict`](crate::FailurePolicy::Strict)).
//!
//! Like the rest of the crate's public types it provides `as_label` and
//! `as_message` helpers for logs/metrics.

use thiserror::Error;

/// # Errors produced by the slow-start runner.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlowStartError {
    /// A callback reported more failures than items in its batch.
    #[error("batch of {batch_size} at pos {pos} reported {failures} failures")]
    FailuresOutOfRange {
        /// Size of the offending batch.
        batch_size: usize,
        /// Offset of the offending batch.
        pos: usize,
        /// Failure count reported by the callback.
        failures: usize,
    },
}

impl SlowStartError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use slowstart::SlowStartError;
    ///
    /// let err = SlowStartError::FailuresOutOfRange { batch_size: 2, pos: 1, failures: 3 };
    /// assert_eq!(err.as_label(), "failures_out_of_range");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SlowStartError::FailuresOutOfRange { .. } => "failures_out_of_range",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SlowStartError::FailuresOutOfRange {
                batch_size,
                pos,
                failures,
            } => format!("failures={failures} exceed batch_size={batch_size} (pos={pos})"),
        }
    }
}
