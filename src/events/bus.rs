//! # Event bus shared by slow-start runs.
//!
//! [`Bus`] carries run and batch events from any number of runners (typically
//! one per controller key) to whoever observes them. Publishing never blocks
//! and needs no async runtime, so the synchronous [`SlowStart::run`](crate::SlowStart::run)
//! publishes too.
//!
//! ```text
//! SlowStart "rs/web" ──┐                  ┌─► bus.watch("rs/web")  (one run)
//! SlowStart "rs/api" ──┼──► Bus ──────────┼─► SubscriberSet::listen (all runs)
//! SubscriberSet      ──┘  (broadcast)     └─► bus.subscribe()       (raw)
//! ```
//!
//! ## Rules
//! - A single ring buffer of `capacity` events serves every receiver; a
//!   receiver that falls further behind loses the oldest events.
//! - Events published while nobody listens are dropped.
//! - [`RunWatch`] only yields run and batch events carrying its run name.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runner events.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev` to every current receiver; dropped when there is none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns a receiver for the events of the run named `name`.
    ///
    /// Subscribe before starting the run; earlier events are not replayed.
    ///
    /// # Example
    /// ```rust
    /// use slowstart::{Bus, EventKind, SlowStart};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let bus = Bus::new(64);
    /// let mut watch = bus.watch("rs/web");
    ///
    /// SlowStart::default()
    ///     .with_bus(bus.clone())
    ///     .with_name("rs/web")
    ///     .run(10, |size, _| if size == 4 { 1 } else { 0 })
    ///     .unwrap();
    ///
    /// let last = watch.finished().await.unwrap();
    /// assert_eq!(last.kind, EventKind::RunAborted);
    /// assert_eq!(last.skipped, Some(3));
    /// # }
    /// ```
    pub fn watch(&self, name: impl Into<Arc<str>>) -> RunWatch {
        RunWatch {
            rx: self.tx.subscribe(),
            name: name.into(),
        }
    }
}

/// Receiver filtered to one named run.
///
/// Returned by [`Bus::watch`].
#[derive(Debug)]
pub struct RunWatch {
    rx: broadcast::Receiver<Event>,
    name: Arc<str>,
}

impl RunWatch {
    /// Run name this receiver follows.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the next event of the watched run.
    ///
    /// Returns `None` once every publisher is gone. Events lost to lag are
    /// skipped silently.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(ev) if self.follows(&ev) => return Some(ev),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the watched run to end and returns its last event
    /// (`RunCompleted`, `RunAborted` or `ContractViolated`).
    pub async fn finished(&mut self) -> Option<Event> {
        while let Some(ev) = self.recv().await {
            if ev.kind.is_terminal() {
                return Some(ev);
            }
        }
        None
    }

    fn follows(&self, ev: &Event) -> bool {
        !ev.kind.is_subscriber() && ev.name.as_deref() == Some(&*self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::RunStarting));
    }

    #[test]
    fn test_receiver_sees_events_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::RunStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::RunCompleted));

        let ev = rx.try_recv().expect("event after subscribe");
        assert_eq!(ev.kind, EventKind::RunCompleted);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_watch_skips_other_runs_and_subscriber_reports() {
        let bus = Bus::new(16);
        let mut watch = bus.watch("rs/web");
        assert_eq!(watch.name(), "rs/web");

        bus.publish(Event::new(EventKind::RunStarting).with_name("rs/api"));
        bus.publish(Event::subscriber_overflow("rs/web", "full"));
        bus.publish(Event::new(EventKind::RunStarting));
        bus.publish(
            Event::new(EventKind::BatchStarting)
                .with_name("rs/web")
                .with_batch(Batch::new(1, 0)),
        );

        let ev = watch.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::BatchStarting);
        assert_eq!(ev.batch(), Some(Batch::new(1, 0)));
    }

    #[tokio::test]
    async fn test_watch_ends_when_bus_is_dropped() {
        let bus = Bus::new(4);
        let mut watch = bus.watch("rs/web");
        bus.publish(Event::new(EventKind::RunStarting).with_name("rs/web"));
        drop(bus);

        assert_eq!(watch.finished().await.map(|ev| ev.kind), None);
    }
}
