//! Runner core: the batching loop and its configurable wrapper.
//!
//! The public API from this module is [`slow_start`] (the bare algorithm),
//! [`SlowStart`] (policies, events, async) and [`Report`].
//!
//! Internal modules:
//! - [`cursor`]: loop bookkeeping shared by every run (pos, next size, clamp);
//! - [`batching`]: the bare `slow_start` function;
//! - [`runner`]: configurable runner with event publishing;
//! - [`report`]: structured outcome of a run.

mod batching;
mod cursor;
mod report;
mod runner;

pub use batching::slow_start;
pub use report::Report;
pub use runner::SlowStart;
