//! # Runner configuration.
//!
//! Provides [`Config`], the settings a [`SlowStart`](crate::SlowStart) runner is built from.
//!
//! ## Sentinel values
//! - `growth.max = 0` → unlimited batch size
//! - `bus_capacity = 0` → clamped to 1 when a bus is created from this config

use crate::events::Bus;
use crate::policies::{FailurePolicy, GrowthPolicy};

/// Configuration for a slow-start runner.
///
/// Defines:
/// - **Batch sizing**: first size, growth factor, cap
/// - **Report validation**: trust callbacks or reject out-of-range counts
/// - **Event system**: bus capacity for event delivery
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across caller code.
#[derive(Clone, Debug)]
pub struct Config {
    /// How batch sizes grow after fully successful batches.
    pub growth: GrowthPolicy,

    /// What to do with failure counts outside `0..=batch_size`.
    pub failures: FailurePolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Creates an event bus sized from this config.
    pub fn bus(&self) -> Bus {
        Bus::new(self.bus_capacity_clamped())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `growth = GrowthPolicy::default()` (1, 2, 4, ... unlimited)
    /// - `failures = FailurePolicy::Trust`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            growth: GrowthPolicy::default(),
            failures: FailurePolicy::default(),
            bus_capacity: 1024,
        }
    }
}
