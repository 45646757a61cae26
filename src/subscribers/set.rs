//! # Event delivery to subscribers.
//!
//! [`SubscriberSet`] hands every event to each [`Subscribe`] through a bounded
//! per-subscriber queue drained by a dedicated worker task.
//!
//! ```text
//! Bus ──► listen(token) ──► emit(event)
//!                              │  batch event and !batch_events() → skipped
//!                              ├──► [queue 1] ──► worker 1 ──► on_event()
//!                              │                     └──► panic → SubscriberPanicked
//!                              └──► [queue N] ──► worker N ──► on_event()
//! token cancelled ──► emit what the bus already holds ──► shutdown (queues drained)
//! ```
//!
//! ## Rules
//! - `emit()` never waits: a full or closed queue drops the event for that
//!   subscriber and publishes `SubscriberOverflow` (never for an overflow event).
//! - Each subscriber sees its events in publish order; there is no ordering
//!   across subscribers.
//! - A subscriber is never handed the overflow or panic reports about itself,
//!   so a subscriber that panics on every event cannot feed itself.
//! - A panic inside `on_event` is reported and the worker moves on.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Sending side of one subscriber's queue.
struct Queue {
    name: &'static str,
    batch_events: bool,
    tx: mpsc::Sender<Arc<Event>>,
}

impl Queue {
    fn wants(&self, ev: &Event) -> bool {
        if ev.kind.is_batch() {
            return self.batch_events;
        }
        !(ev.kind.is_subscriber() && ev.name.as_deref() == Some(self.name))
    }
}

/// Subscribers of one bus, each behind its own queue and worker.
///
/// Must be created inside a tokio runtime (workers are spawned immediately).
pub struct SubscriberSet {
    queues: Vec<Queue>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber.
    ///
    /// `bus` is where `listen` reads from and where overflow and panic
    /// reports are published.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut queues = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            queues.push(Queue {
                name: sub.name(),
                batch_events: sub.batch_events(),
                tx,
            });
            workers.push(tokio::spawn(deliver(sub, rx, bus.clone())));
        }

        Self {
            queues,
            workers,
            bus,
        }
    }

    /// Queues `event` for every subscriber that wants it, without waiting.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());

        for queue in self.queues.iter().filter(|q| q.wants(&event)) {
            let reason = match queue.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !event.is_subscriber_overflow() {
                self.bus
                    .publish(Event::subscriber_overflow(queue.name, reason));
            }
        }
    }

    /// Forwards bus events to the subscribers until `token` is cancelled.
    ///
    /// On cancellation, events already published are still emitted, then the
    /// set shuts down; the returned handle completes once every subscriber
    /// has processed its queue.
    ///
    /// # Example
    /// ```rust
    /// use std::sync::Arc;
    /// use slowstart::{RunTally, SlowStart, Subscribe, SubscriberSet};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let runner = SlowStart::default().with_name("rs/web");
    /// let bus = runner.config().bus();
    /// let runner = runner.with_bus(bus.clone());
    ///
    /// let tally = Arc::new(RunTally::new());
    /// let subs: Vec<Arc<dyn Subscribe>> = vec![tally.clone()];
    /// let token = CancellationToken::new();
    /// let listener = SubscriberSet::new(subs, bus).listen(token.clone());
    ///
    /// runner.run(10, |size, _| if size == 4 { 1 } else { 0 }).unwrap();
    ///
    /// token.cancel();
    /// listener.await.unwrap();
    /// assert_eq!(tally.get("rs/web").unwrap().skipped, 3);
    /// # }
    /// ```
    pub fn listen(self, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    res = rx.recv() => match res {
                        Ok(ev) => self.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }

            // Bounded by what was pending at the stop; reports published
            // while draining are not forwarded.
            for _ in 0..rx.len() {
                match rx.try_recv() {
                    Ok(ev) => self.emit(&ev),
                    Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            self.shutdown().await;
        })
    }

    /// Closes every queue and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.queues);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.len()
    }
}

/// Worker loop of one subscriber: runs until its queue is closed and empty.
async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Recorder {
        name: &'static str,
        batch_events: bool,
        seen: Mutex<Vec<EventKind>>,
    }

    impl Recorder {
        fn new(name: &'static str, batch_events: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                batch_events,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<EventKind> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            self.name
        }
        fn batch_events(&self) -> bool {
            self.batch_events
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    /// Holds every event until released; queue of one.
    struct Gate {
        open: Notify,
    }

    #[async_trait]
    impl Subscribe for Gate {
        async fn on_event(&self, _ev: &Event) {
            self.open.notified().await;
        }
        fn name(&self) -> &'static str {
            "gate"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    fn batch_event(kind: EventKind) -> Event {
        Event::new(kind).with_name("rs/web").with_batch(Batch::new(2, 1))
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber_in_order() {
        let a = Recorder::new("a", true);
        let b = Recorder::new("b", true);
        let subs: Vec<Arc<dyn Subscribe>> = vec![a.clone(), b.clone()];
        let set = SubscriberSet::new(subs, Bus::new(16));
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::RunStarting));
        set.emit(&batch_event(EventKind::BatchStarting));
        set.emit(&Event::new(EventKind::RunCompleted));
        set.shutdown().await;

        for rec in [a, b] {
            assert_eq!(
                rec.seen(),
                vec![
                    EventKind::RunStarting,
                    EventKind::BatchStarting,
                    EventKind::RunCompleted
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_outcome_only_subscriber_skips_batch_events() {
        let rec = Recorder::new("outcomes", false);
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone()];
        let set = SubscriberSet::new(subs, Bus::new(16));

        set.emit(&Event::new(EventKind::RunStarting));
        set.emit(&batch_event(EventKind::BatchStarting));
        set.emit(&batch_event(EventKind::BatchFailed));
        set.emit(&batch_event(EventKind::ContractViolated));
        set.emit(&Event::new(EventKind::RunAborted));
        set.shutdown().await;

        assert_eq!(
            rec.seen(),
            vec![
                EventKind::RunStarting,
                EventKind::ContractViolated,
                EventKind::RunAborted
            ]
        );
    }

    #[tokio::test]
    async fn test_own_reports_are_not_delivered_back() {
        let rec = Recorder::new("audit", true);
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone()];
        let set = SubscriberSet::new(subs, Bus::new(16));

        set.emit(&Event::subscriber_overflow("audit", "full"));
        set.emit(&Event::subscriber_panicked("audit", "boom".into()));
        set.emit(&Event::subscriber_overflow("other", "full"));
        set.shutdown().await;

        assert_eq!(rec.seen(), vec![EventKind::SubscriberOverflow]);
    }

    #[tokio::test]
    async fn test_full_queue_reports_overflow_once() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let gate = Arc::new(Gate {
            open: Notify::new(),
        });
        let subs: Vec<Arc<dyn Subscribe>> = vec![gate.clone()];
        let set = SubscriberSet::new(subs, bus);

        // The worker has not run yet: the first event fills the queue.
        set.emit(&Event::new(EventKind::RunStarting));
        set.emit(&batch_event(EventKind::BatchStarting));

        let ev = rx.try_recv().expect("overflow report");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.name.as_deref(), Some("gate"));
        assert_eq!(ev.reason.as_deref(), Some("full"));

        // An overflow event that overflows itself is not reported again.
        set.emit(&Event::subscriber_overflow("other", "full"));
        assert!(rx.try_recv().is_err());

        gate.open.notify_one();
        set.shutdown().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_queue_reports_overflow() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let rec = Recorder::new("gone", true);
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone()];
        let mut set = SubscriberSet::new(subs, bus);

        for worker in std::mem::take(&mut set.workers) {
            worker.abort();
            assert!(worker.await.unwrap_err().is_cancelled());
        }

        set.emit(&Event::new(EventKind::RunStarting));
        let ev = rx.try_recv().expect("overflow report");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.name.as_deref(), Some("gone"));
        assert_eq!(ev.reason.as_deref(), Some("closed"));
        assert!(rec.seen().is_empty());
    }

    #[tokio::test]
    async fn test_panic_is_reported_on_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Panicker)];
        let set = SubscriberSet::new(subs, bus);

        set.emit(&Event::new(EventKind::RunStarting));
        let ev = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("panic report")
            .unwrap();

        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.name.as_deref(), Some("panicker"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        set.shutdown().await;
    }

    #[tokio::test]
    async fn test_listen_delivers_everything_published_before_stop() {
        let bus = Bus::new(16);
        let rec = Recorder::new("recorder", true);
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone()];
        let token = CancellationToken::new();
        let listener = SubscriberSet::new(subs, bus.clone()).listen(token.clone());

        bus.publish(Event::new(EventKind::RunStarting));
        bus.publish(batch_event(EventKind::BatchStarting));
        bus.publish(batch_event(EventKind::BatchSucceeded));
        bus.publish(Event::new(EventKind::RunCompleted));
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .expect("listener stops after cancel")
            .unwrap();

        assert_eq!(
            rec.seen(),
            vec![
                EventKind::RunStarting,
                EventKind::BatchStarting,
                EventKind::BatchSucceeded,
                EventKind::RunCompleted
            ]
        );
    }

    #[tokio::test]
    async fn test_listen_ignores_events_after_stop() {
        let bus = Bus::new(16);
        let rec = Recorder::new("recorder", true);
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone()];
        let token = CancellationToken::new();
        let listener = SubscriberSet::new(subs, bus.clone()).listen(token.clone());

        token.cancel();
        listener.await.unwrap();
        bus.publish(Event::new(EventKind::RunStarting));

        assert!(rec.seen().is_empty());
    }

    #[tokio::test]
    async fn test_empty_set() {
        let set = SubscriberSet::new(Vec::new(), Bus::new(1));
        assert!(set.is_empty());
        set.emit(&Event::new(EventKind::RunStarting));
        set.shutdown().await;
    }
}
