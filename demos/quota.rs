//! # Example: quota
//!
//! A controller wants 500 children but the project quota only allows a random
//! number of them. Slow start finds out after a few dozen requests instead of
//! sending all 500.
//!
//! ## Flow
//! ```text
//! slow_start(500, start)
//!   ├─► start(1, 0)   → 0 failures
//!   ├─► start(2, 1)   → 0 failures
//!   ├─► start(4, 3)   → 0 failures
//!   ├─► ...
//!   └─► start(n, pos) → k > 0 failures → stop, skipped = 500 - n - pos
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example quota
//! ```

use rand::Rng;
use slowstart::slow_start;

fn main() {
    let quota: usize = rand::rng().random_range(1..=500);
    let mut created = 0usize;
    let mut requests = 0usize;

    println!("[main] quota={quota}");

    let skipped = slow_start(500, |batch_size, pos| {
        requests += batch_size;
        let ok = batch_size.min(quota - created);
        created += ok;
        let failed = batch_size - ok;
        println!("[batch] size={batch_size} pos={pos} failed={failed}");
        failed
    });

    println!("[main] created={created} requests={requests} skipped={skipped}");
}
