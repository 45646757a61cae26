//! # Batches and start callbacks.
//!
//! This module provides the caller-facing side of a run:
//! - [`Batch`] - one contiguous range of items handed to a callback
//! - [`StartBatch`] / [`StartFn`] - asynchronous callback `Batch -> failures`
//! - [`fan_out`] / [`fan_out_cancellable`] - concurrent dispatch inside a callback

mod batch;
mod fan_out;
mod start;

pub use batch::Batch;
pub use fan_out::{BatchOutcome, fan_out, fan_out_cancellable};
pub use start::{StartBatch, StartFn};
