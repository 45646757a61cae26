//! # Start callbacks.
//!
//! A start callback attempts exactly one batch and reports how many of its
//! items failed. Synchronous callbacks are plain `FnMut(usize, usize) -> usize`
//! closures taking `(batch_size, pos)`. Asynchronous ones implement
//! [`StartBatch`] (`Batch -> failures`); wrap a closure in [`StartFn`] or
//! implement the trait on your own type.
//!
//! ## Contract
//! - Attempt exactly `batch_size` items, logically at offset `pos`.
//! - Return the number of attempts that **failed** (`0..=batch_size`).
//! - Return only once the whole batch is settled; the runner issues nothing
//!   else while a callback is in flight.

use std::future::Future;

use async_trait::async_trait;

use super::Batch;

/// # Asynchronous start operation.
///
/// Implementations typically dispatch the batch's items concurrently (see
/// [`fan_out`](crate::fan_out)) and return the aggregated failure count.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use slowstart::{Batch, StartBatch};
///
/// struct Pods;
///
/// #[async_trait]
/// impl StartBatch for Pods {
///     async fn start(&mut self, batch: Batch) -> usize {
///         // create `batch.size` pods...
///         let _ = batch;
///         0
///     }
/// }
/// ```
#[async_trait]
pub trait StartBatch: Send {
    /// Attempts every item of `batch` and returns the failure count.
    async fn start(&mut self, batch: Batch) -> usize;
}

/// Closure-backed [`StartBatch`].
///
/// Wraps a closure that *creates* a new future per batch. The future owns its
/// state; share caller state through `Arc<...>` captured by the closure.
///
/// ```rust
/// use slowstart::{Batch, StartFn};
///
/// let start = StartFn::new(|batch: Batch| async move {
///     let _ = batch;
///     0
/// });
/// # let _ = start;
/// ```
#[derive(Debug)]
pub struct StartFn<F> {
    f: F,
}

impl<F> StartFn<F> {
    /// Creates a new closure-backed start operation.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> StartBatch for StartFn<F>
where
    F: FnMut(Batch) -> Fut + Send,
    Fut: Future<Output = usize> + Send + 'static,
{
    async fn start(&mut self, batch: Batch) -> usize {
        (self.f)(batch).await
    }
}
