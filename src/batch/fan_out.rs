//! # Concurrent dispatch of one batch.
//!
//! The runner never parallelizes anything itself: it hands one [`Batch`] to the
//! callback and waits. Inside the callback, the usual thing to do is to start
//! all `batch.size` items at once and count what failed. [`fan_out`] does that.
//!
//! ## Diagram
//! ```text
//!   fan_out(batch [pos..end), f)
//!        │
//!        ├──► f(pos)     ──┐
//!        ├──► f(pos + 1) ──┤   join_all (concurrent, same task)
//!        └──► f(end - 1) ──┘
//!                          ▼
//!                   BatchOutcome { failed: [(index, err)], canceled }
//! ```
//!
//! ## Cancellation
//! The runner has no cancellation hook. A callback becomes cancellable by using
//! [`fan_out_cancellable`]: items still pending when the token fires are
//! abandoned and counted as failures, which stops the run after this batch.

use std::future::Future;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use super::Batch;

/// Settled result of one fanned-out batch.
#[derive(Debug)]
pub struct BatchOutcome<E> {
    /// The batch that was dispatched.
    pub batch: Batch,
    /// Items that failed, with their item index (in `batch.range()`).
    pub failed: Vec<(usize, E)>,
    /// Items abandoned because the cancellation token fired.
    pub canceled: usize,
}

impl<E> BatchOutcome<E> {
    fn new(batch: Batch) -> Self {
        Self {
            batch,
            failed: Vec::new(),
            canceled: 0,
        }
    }

    /// Failure count to report back to the runner (failed + canceled).
    #[inline]
    pub fn failures(&self) -> usize {
        self.failed.len() + self.canceled
    }

    /// Number of items that completed successfully.
    #[inline]
    pub fn succeeded(&self) -> usize {
        self.batch.size.saturating_sub(self.failures())
    }

    /// True if every item of the batch succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Consumes the outcome, returning only the item errors.
    pub fn into_errors(self) -> Vec<E> {
        self.failed.into_iter().map(|(_, e)| e).collect()
    }
}

/// Starts every item of `batch` concurrently and waits for all of them.
///
/// `f` is called once per item index in `batch.range()`, in order; the returned
/// futures are then driven together.
///
/// # Example
/// ```rust
/// use slowstart::{Batch, fan_out};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let outcome = fan_out(Batch::new(4, 0), |i| async move {
///     if i == 2 { Err("quota exceeded") } else { Ok(()) }
/// })
/// .await;
///
/// assert_eq!(outcome.failures(), 1);
/// assert_eq!(outcome.failed[0].0, 2);
/// # }
/// ```
pub async fn fan_out<F, Fut, E>(batch: Batch, mut f: F) -> BatchOutcome<E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let results = join_all(batch.range().map(|i| {
        let fut = f(i);
        async move { (i, fut.await) }
    }))
    .await;

    let mut outcome = BatchOutcome::new(batch);
    for (i, res) in results {
        if let Err(e) = res {
            outcome.failed.push((i, e));
        }
    }
    outcome
}

/// Like [`fan_out`], but abandons pending items when `token` is cancelled.
///
/// ### Cancellation semantics
/// - Token already cancelled → no item is started; the whole batch is canceled.
/// - Token cancelled mid-flight → items not yet settled are dropped and counted
///   in [`BatchOutcome::canceled`]; items that already settled keep their result.
pub async fn fan_out_cancellable<F, Fut, E>(
    batch: Batch,
    token: &CancellationToken,
    mut f: F,
) -> BatchOutcome<E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut outcome = BatchOutcome::new(batch);
    if token.is_cancelled() {
        outcome.canceled = batch.size;
        return outcome;
    }

    let results = join_all(batch.range().map(|i| {
        let fut = f(i);
        async move {
            tokio::select! {
                biased;
                res = fut => Some((i, res)),
                _ = token.cancelled() => None,
            }
        }
    }))
    .await;

    for settled in results {
        match settled {
            Some((_, Ok(()))) => {}
            Some((i, Err(e))) => outcome.failed.push((i, e)),
            None => outcome.canceled += 1,
        }
    }
    outcome
}
