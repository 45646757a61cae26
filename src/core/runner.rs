//! # SlowStart: configurable batch runner.
//!
//! Same loop as [`slow_start`](crate::slow_start), with:
//! - batch sizing from [`GrowthPolicy`](crate::GrowthPolicy),
//! - report validation from [`FailurePolicy`](crate::FailurePolicy),
//! - run and batch events published to an optional [`Bus`],
//! - a structured [`Report`] instead of a bare skip count,
//! - an async surface for callbacks that fan out over the network.
//!
//! ## Event flow
//! ```text
//! RunStarting
//!   ├─► BatchStarting → [start(batch)] → BatchSucceeded → (next batch)
//!   │                                  → BatchFailed → RunAborted
//!   │                                  → ContractViolated (strict only)
//!   └─► RunCompleted (no batch left)
//! ```
//!
//! ## Rules
//! - Batches run **sequentially**; the next size is computed only after the
//!   callback returned.
//! - With the default [`Config`], the `(batch_size, pos)` sequence and the skip
//!   count are exactly those of [`slow_start`](crate::slow_start).
//! - No internal retries, no cancellation hook: make the callback cancellable
//!   instead (see [`fan_out_cancellable`](crate::fan_out_cancellable)).

use std::future::Future;
use std::sync::Arc;

use crate::batch::{Batch, StartBatch, StartFn};
use crate::config::Config;
use crate::core::cursor::BatchCursor;
use crate::core::report::Report;
use crate::error::SlowStartError;
use crate::events::{Bus, Event, EventKind};

/// Configurable slow-start runner.
///
/// Cheap to clone; a single runner can drive any number of runs.
///
/// # Example
/// ```rust
/// use slowstart::{Config, GrowthPolicy, SlowStart};
///
/// let runner = SlowStart::new(Config {
///     growth: GrowthPolicy { max: 4, ..GrowthPolicy::default() },
///     ..Config::default()
/// })
/// .with_name("replicaset/web");
///
/// let mut sizes = Vec::new();
/// let report = runner
///     .run(12, |size, _pos| {
///         sizes.push(size);
///         0
///     })
///     .unwrap();
///
/// assert_eq!(sizes, vec![1, 2, 4, 4, 1]);
/// assert!(report.is_complete());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SlowStart {
    cfg: Config,
    bus: Option<Bus>,
    name: Option<Arc<str>>,
}

impl SlowStart {
    /// Creates a runner from `cfg` without an event bus.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            bus: None,
            name: None,
        }
    }

    /// Publishes run and batch events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Attaches a name to every event of this runner (e.g. the owning object's key).
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the runner configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the event bus, if configured.
    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }

    /// Runs a synchronous callback over `to_start` items.
    ///
    /// ### Errors
    /// Only [`SlowStartError::FailuresOutOfRange`], and only under
    /// [`FailurePolicy::Strict`](crate::FailurePolicy::Strict).
    pub fn run<F>(&self, to_start: usize, mut start: F) -> Result<Report, SlowStartError>
    where
        F: FnMut(usize, usize) -> usize,
    {
        let mut run = Run::begin(self, to_start);
        while let Some(batch) = run.next_batch() {
            let failures = start(batch.size, batch.pos);
            if let Some(report) = run.settle(batch, failures)? {
                return Ok(report);
            }
        }
        Ok(run.complete())
    }

    /// Runs an asynchronous callback over `to_start` items.
    ///
    /// Each batch's future is awaited to completion before the next batch is sized.
    pub async fn run_async<S>(&self, to_start: usize, start: &mut S) -> Result<Report, SlowStartError>
    where
        S: StartBatch + ?Sized,
    {
        let mut run = Run::begin(self, to_start);
        while let Some(batch) = run.next_batch() {
            let failures = start.start(batch).await;
            if let Some(report) = run.settle(batch, failures)? {
                return Ok(report);
            }
        }
        Ok(run.complete())
    }

    /// Runs an async closure over `to_start` items.
    ///
    /// Shorthand for `run_async(to_start, &mut StartFn::new(f))`.
    ///
    /// ```rust
    /// use slowstart::{Batch, SlowStart, fan_out};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let report = SlowStart::default()
    ///     .run_fn(20, |batch: Batch| async move {
    ///         fan_out(batch, |i| async move {
    ///             if i >= 10 { Err("quota exceeded") } else { Ok(()) }
    ///         })
    ///         .await
    ///         .failures()
    ///     })
    ///     .await
    ///     .unwrap();
    ///
    /// // 1 + 2 + 4 succeed, the batch of 8 at pos 7 crosses the quota.
    /// assert_eq!(report.attempted, 15);
    /// assert_eq!(report.skipped, 5);
    /// # }
    /// ```
    pub async fn run_fn<F, Fut>(&self, to_start: usize, f: F) -> Result<Report, SlowStartError>
    where
        F: FnMut(Batch) -> Fut + Send,
        Fut: Future<Output = usize> + Send + 'static,
    {
        self.run_async(to_start, &mut StartFn::new(f)).await
    }

    /// Publishes an event built by `make`, tagged with the runner name.
    ///
    /// Events are only built when a bus is configured.
    fn publish(&self, make: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(make().with_name_opt(self.name.as_ref()));
        }
    }
}

/// State of one run in progress.
struct Run<'a> {
    runner: &'a SlowStart,
    cursor: BatchCursor,
    batches: usize,
}

impl<'a> Run<'a> {
    fn begin(runner: &'a SlowStart, to_start: usize) -> Self {
        runner.publish(|| Event::new(EventKind::RunStarting).with_requested(to_start));
        Self {
            runner,
            cursor: BatchCursor::new(to_start, runner.cfg.growth),
            batches: 0,
        }
    }

    fn next_batch(&mut self) -> Option<Batch> {
        let batch = self.cursor.next_batch()?;
        self.batches += 1;
        self.runner
            .publish(|| Event::new(EventKind::BatchStarting).with_batch(batch));
        Some(batch)
    }

    /// Applies a callback report; `Some(report)` ends the run.
    fn settle(&mut self, batch: Batch, failures: usize) -> Result<Option<Report>, SlowStartError> {
        if let Err(err) = self.runner.cfg.failures.check(batch, failures) {
            self.runner.publish(|| {
                Event::new(EventKind::ContractViolated)
                    .with_batch(batch)
                    .with_failures(failures)
                    .with_reason(err.as_message())
            });
            return Err(err);
        }

        if failures == 0 {
            self.runner
                .publish(|| Event::new(EventKind::BatchSucceeded).with_batch(batch));
            self.cursor.advance(batch);
            return Ok(None);
        }

        let skipped = self.cursor.skipped_after(batch);
        let report = Report::aborted(
            self.cursor.to_start(),
            self.batches,
            batch,
            failures,
            skipped,
        );
        self.runner.publish(|| {
            Event::new(EventKind::BatchFailed)
                .with_batch(batch)
                .with_failures(failures)
                .with_skipped(skipped)
        });
        self.runner.publish(|| {
            Event::new(EventKind::RunAborted)
                .with_requested(report.requested)
                .with_attempted(report.attempted)
                .with_skipped(report.skipped)
        });
        Ok(Some(report))
    }

    fn complete(self) -> Report {
        debug_assert_eq!(self.cursor.attempted(), self.cursor.to_start());
        let report = Report::completed(self.cursor.to_start(), self.batches);
        self.runner.publish(|| {
            Event::new(EventKind::RunCompleted)
                .with_requested(report.requested)
                .with_attempted(report.attempted)
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batching::slow_start;
    use crate::policies::{FailurePolicy, GrowthPolicy};
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn kinds(events: &[Event]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    /// Fails everything past `limit` cumulative attempts.
    fn over_limit(limit: usize, attempts: &mut usize, size: usize) -> usize {
        *attempts += size;
        if *attempts > limit {
            size.min(*attempts - limit)
        } else {
            0
        }
    }

    #[test]
    fn test_default_runner_matches_plain_function() {
        let runner = SlowStart::default();
        for (total, limit) in [(0, 0), (1, 0), (10, 1), (500, 31), (500, 400), (500, 500)] {
            let mut plain_calls = Vec::new();
            let mut plain_attempts = 0;
            let skipped = slow_start(total, |size, pos| {
                plain_calls.push((size, pos));
                over_limit(limit, &mut plain_attempts, size)
            });

            let mut calls = Vec::new();
            let mut attempts = 0;
            let report = runner
                .run(total, |size, pos| {
                    calls.push((size, pos));
                    over_limit(limit, &mut attempts, size)
                })
                .unwrap();

            assert_eq!(calls, plain_calls, "total={total} limit={limit}");
            assert_eq!(report.skipped, skipped, "total={total} limit={limit}");
            assert_eq!(report.batches, calls.len());
            assert_eq!(report.attempted + report.skipped, total);
        }
    }

    #[test]
    fn test_report_for_aborted_run() {
        let report = SlowStart::default()
            .run(500, |size, _| if size == 32 { 3 } else { 0 })
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failed, Some(Batch::new(32, 31)));
        assert_eq!(report.failures, 3);
        assert_eq!(report.attempted, 63);
        assert_eq!(report.skipped, 437);
        assert_eq!(report.batches, 6);
    }

    #[test]
    fn test_run_accepts_unannotated_closure() {
        let quota = 5;
        let mut created = 0;
        let report = SlowStart::default()
            .run(100, |batch_size, _pos| {
                let ok = batch_size.min(quota - created);
                created += ok;
                batch_size - ok
            })
            .unwrap();

        assert_eq!(created, 5);
        assert_eq!(report.failed, Some(Batch::new(4, 3)));
        assert_eq!(report.skipped, 93);
    }

    #[test]
    fn test_report_for_empty_run() {
        let report = SlowStart::default().run(0, |_, _| 1).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.batches, 0);
        assert_eq!(report.attempted, 0);
    }

    #[test]
    fn test_growth_policy_is_applied() {
        let runner = SlowStart::new(Config {
            growth: GrowthPolicy {
                first: 3,
                factor: 3,
                max: 20,
            },
            ..Config::default()
        });

        let mut sizes = Vec::new();
        runner
            .run(60, |size, _| {
                sizes.push(size);
                0
            })
            .unwrap();
        assert_eq!(sizes, vec![3, 9, 20, 20, 8]);
    }

    #[test]
    fn test_trust_policy_ignores_bogus_counts() {
        let report = SlowStart::default()
            .run(10, |size, _| if size == 2 { 1_000 } else { 0 })
            .unwrap();
        assert_eq!(report.skipped, 7);
        assert_eq!(report.failures, 1_000);
    }

    #[test]
    fn test_strict_policy_rejects_bogus_counts() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let runner = SlowStart::new(Config {
            failures: FailurePolicy::Strict,
            ..Config::default()
        })
        .with_bus(bus);

        let mut calls = 0;
        let err = runner
            .run(10, |size, _| {
                calls += 1;
                if size == 2 { 3 } else { 0 }
            })
            .unwrap_err();

        assert_eq!(
            err,
            SlowStartError::FailuresOutOfRange {
                batch_size: 2,
                pos: 1,
                failures: 3
            }
        );
        assert_eq!(calls, 2);

        let events = drain(&mut rx);
        let last = events.last().expect("events published");
        assert_eq!(last.kind, EventKind::ContractViolated);
        assert_eq!(last.failures, Some(3));
        assert!(last.reason.is_some());
    }

    #[test]
    fn test_strict_policy_accepts_whole_batch_failure() {
        let runner = SlowStart::new(Config {
            failures: FailurePolicy::Strict,
            ..Config::default()
        });
        let report = runner
            .run(10, |size, _| if size == 4 { 4 } else { 0 })
            .unwrap();
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn test_events_for_completed_run() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        SlowStart::default()
            .with_bus(bus)
            .with_name("job/a")
            .run(3, |_, _| 0)
            .unwrap();

        let events = drain(&mut rx);
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::RunStarting,
                EventKind::BatchStarting,
                EventKind::BatchSucceeded,
                EventKind::BatchStarting,
                EventKind::BatchSucceeded,
                EventKind::RunCompleted,
            ]
        );
        assert!(events.iter().all(|e| e.name.as_deref() == Some("job/a")));
        assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
        assert_eq!(events[0].requested, Some(3));
        assert_eq!(events[3].batch(), Some(Batch::new(2, 1)));
        assert_eq!(events[5].attempted, Some(3));
    }

    #[test]
    fn test_events_for_aborted_run() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        SlowStart::default()
            .with_bus(bus)
            .run(10, |size, _| if size == 2 { 1 } else { 0 })
            .unwrap();

        let events = drain(&mut rx);
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::RunStarting,
                EventKind::BatchStarting,
                EventKind::BatchSucceeded,
                EventKind::BatchStarting,
                EventKind::BatchFailed,
                EventKind::RunAborted,
            ]
        );
        let failed = &events[4];
        assert_eq!(failed.batch(), Some(Batch::new(2, 1)));
        assert_eq!(failed.failures, Some(1));
        assert_eq!(failed.skipped, Some(7));
        assert_eq!(events[5].attempted, Some(3));
        assert!(events.iter().all(|e| e.name.is_none()));
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let runner = SlowStart::default();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);

        let report = runner
            .run_fn(500, move |batch: Batch| {
                let sink = Arc::clone(&sink);
                async move {
                    let mut calls = sink.lock().unwrap();
                    calls.push((batch.size, batch.pos));
                    if batch.end() > 31 { 1 } else { 0 }
                }
            })
            .await
            .unwrap();

        let mut sync_calls = Vec::new();
        let sync_report = runner
            .run(500, |size, pos| {
                sync_calls.push((size, pos));
                if size + pos > 31 { 1 } else { 0 }
            })
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), sync_calls);
        assert_eq!(report, sync_report);
    }

    #[tokio::test]
    async fn test_async_trait_object() {
        struct Quota {
            left: usize,
        }

        #[async_trait::async_trait]
        impl StartBatch for Quota {
            async fn start(&mut self, batch: Batch) -> usize {
                let ok = batch.size.min(self.left);
                self.left -= ok;
                batch.size - ok
            }
        }

        let mut quota = Quota { left: 5 };
        let start: &mut dyn StartBatch = &mut quota;
        let report = SlowStart::default().run_async(100, start).await.unwrap();

        assert_eq!(report.failed, Some(Batch::new(4, 3)));
        assert_eq!(report.failures, 2);
        assert_eq!(report.skipped, 93);
        assert_eq!(quota.left, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_can_be_spawned() {
        let runner = SlowStart::default();
        let handle = tokio::spawn(async move {
            runner
                .run_fn(64, |batch: Batch| async move {
                    tokio::task::yield_now().await;
                    usize::from(batch.pos >= 100)
                })
                .await
        });

        let report = handle.await.unwrap().unwrap();
        assert!(report.is_complete());
        assert_eq!(report.batches, 7);
    }
}
