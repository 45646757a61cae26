//! Batch growth and failure policies.
//!
//! This module groups the knobs that control **how large** each batch is and
//! **how strictly** a callback's failure report is checked.
//!
//! ## Contents
//! - [`GrowthPolicy`] how batch sizes evolve (first / factor / max)
//! - [`FailurePolicy`] whether out-of-contract failure counts are rejected
//!
//! ## Quick wiring
//! ```text
//! Config { growth: GrowthPolicy, failures: FailurePolicy, .. }
//!      └─► core::SlowStart uses:
//!           - growth.first_size / growth.next to size batches
//!           - failures.check(batch, n) on every report
//! ```
//!
//! ## Defaults
//! - `GrowthPolicy::default()` → first=1, factor=2, max=unlimited.
//! - `FailurePolicy::Trust`.

mod failure;
mod growth;

pub use failure::FailurePolicy;
pub use growth::GrowthPolicy;
