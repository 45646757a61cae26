//! # Example: fan_out
//!
//! Creates 100 children concurrently per batch against a flaky API that starts
//! refusing after a while, with every run and batch event printed by
//! [`LogWriter`](slowstart::LogWriter) and the outcome counted by
//! [`RunTally`](slowstart::RunTally).
//!
//! ## Run
//! ```bash
//! cargo run --example fan_out --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use slowstart::{Batch, LogWriter, RunTally, SlowStart, Subscribe, SubscriberSet, fan_out};
use tokio_util::sync::CancellationToken;

static CREATED: AtomicUsize = AtomicUsize::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runner = SlowStart::default().with_name("replicaset/web");
    let bus = runner.config().bus();
    let runner = runner.with_bus(bus.clone());

    let tally = Arc::new(RunTally::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), tally.clone()];
    let token = CancellationToken::new();
    let listener = SubscriberSet::new(subs, bus).listen(token.clone());

    let report = runner
        .run_fn(100, |batch: Batch| async move {
            let outcome = fan_out(batch, |i| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                if CREATED.fetch_add(1, Ordering::SeqCst) >= 42 {
                    Err(format!("child-{i}: exceeded quota"))
                } else {
                    Ok(())
                }
            })
            .await;
            for err in &outcome.failed {
                println!("[create] {:?}", err);
            }
            outcome.failures()
        })
        .await?;

    token.cancel();
    listener.await?;

    println!(
        "[main] attempted={} skipped={} batches={}",
        report.attempted, report.skipped, report.batches
    );
    if let Some(stats) = tally.get("replicaset/web") {
        println!("[main] tally {stats:?}");
    }
    Ok(())
}
