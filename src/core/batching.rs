//! # The slow-start batch runner.
//!
//! Starts `to_start` items in batches of 1, 2, 4, 8, ... so that a systemic
//! failure (a quota error, a missing permission) is discovered after a handful
//! of attempts instead of after all of them.
//!
//! ```text
//! batch_size = 1, pos = 0
//! while pos < to_start {
//!   ├─► failures = start(batch_size, pos)
//!   ├─► failures > 0 ─► return to_start - batch_size - pos   (skipped)
//!   └─► pos += batch_size
//!       batch_size = min(2 × batch_size, to_start - pos)
//! }
//! return 0
//! ```
//!
//! ## Rules
//! - One callback invocation per batch, strictly sequential.
//! - Only whether `failures` is nonzero matters, not its magnitude.
//! - A partially failed batch still aborts the run; retrying the skipped
//!   remainder is the caller's job (typically on its next sync pass).
//! - The callback is trusted; use [`SlowStart`](crate::SlowStart) with
//!   [`FailurePolicy::Strict`](crate::FailurePolicy::Strict) to validate reports.

use crate::core::cursor::BatchCursor;
use crate::policies::GrowthPolicy;

/// Runs `start` over `to_start` items in doubling batches.
///
/// Returns the number of items that were never attempted: `0` when every batch
/// succeeded, otherwise `to_start - batch_size - pos` for the first batch that
/// reported a failure.
///
/// # Example
/// ```rust
/// use slowstart::slow_start;
///
/// let quota = 5;
/// let mut created = 0;
/// let skipped = slow_start(100, |batch_size, _pos| {
///     let ok = batch_size.min(quota - created.min(quota));
///     created += ok;
///     batch_size - ok
/// });
///
/// // Batches 1, 2 succeed; batch of 4 hits the quota after 2 more creations.
/// assert_eq!(created, 5);
/// assert_eq!(skipped, 100 - 7);
/// ```
pub fn slow_start<F>(to_start: usize, mut start: F) -> usize
where
    F: FnMut(usize, usize) -> usize,
{
    let mut cursor = BatchCursor::new(to_start, GrowthPolicy::default());
    while let Some(batch) = cursor.next_batch() {
        // Items we never attempt are retried by the caller on its next pass.
        if start(batch.size, batch.pos) > 0 {
            return cursor.skipped_after(batch);
        }
        cursor.advance(batch);
    }
    0
}
