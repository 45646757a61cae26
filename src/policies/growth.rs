//! # Growth policy for batch sizes.
//!
//! [`GrowthPolicy`] controls how batch sizes grow after fully successful batches.
//! It is parameterized by:
//! - [`GrowthPolicy::first`] the size of the first batch;
//! - [`GrowthPolicy::factor`] the multiplicative growth factor;
//! - [`GrowthPolicy::max`] the maximum batch size (`0` = unlimited).
//!
//! Every size is additionally clamped to the number of items that remain, so a
//! run never attempts more than it was asked to.
//!
//! # Example
//! ```rust
//! use slowstart::GrowthPolicy;
//!
//! let growth = GrowthPolicy::default();
//!
//! // First batch is always a single item (unless nothing is requested).
//! assert_eq!(growth.first_size(500), 1);
//!
//! // Doubling after each successful batch...
//! assert_eq!(growth.next(1, 499), 2);
//! assert_eq!(growth.next(2, 497), 4);
//!
//! // ...clamped to what is left.
//! assert_eq!(growth.next(256, 5), 5);
//! ```

/// Batch size growth policy.
///
/// The default (`first = 1`, `factor = 2`, `max = 0`) yields the classic
/// slow-start sequence 1, 2, 4, 8, ... clamped to the remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Size of the first batch (clamped to at least 1).
    pub first: usize,
    /// Multiplicative growth factor applied after a successful batch (clamped to at least 1).
    pub factor: usize,
    /// Maximum batch size; `0` means unlimited.
    pub max: usize,
}

impl Default for GrowthPolicy {
    /// Returns a policy with:
    /// - `first = 1`;
    /// - `factor = 2` (doubling);
    /// - `max = 0` (unlimited).
    fn default() -> Self {
        Self {
            first: 1,
            factor: 2,
            max: 0,
        }
    }
}

impl GrowthPolicy {
    /// Returns the batch size cap as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → no batch is larger than `n`
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        if self.max == 0 { None } else { Some(self.max) }
    }

    /// Size of the first batch of a run over `to_start` items.
    ///
    /// Returns `0` only when `to_start` is `0`.
    pub fn first_size(&self, to_start: usize) -> usize {
        self.clamp(self.first.max(1), to_start)
    }

    /// Size of the batch following a fully successful batch of `prev` items,
    /// with `remaining` items left to attempt.
    ///
    /// Never returns `0` while `remaining > 0`.
    pub fn next(&self, prev: usize, remaining: usize) -> usize {
        let grown = prev.max(1).saturating_mul(self.factor.max(1));
        self.clamp(grown, remaining)
    }

    fn clamp(&self, size: usize, remaining: usize) -> usize {
        let capped = match self.limit() {
            Some(max) => size.min(max),
            None => size,
        };
        capped.min(remaining)
    }
}
