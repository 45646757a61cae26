//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [run-starting] run="rs/web" requested=500
//! [batch-starting] run="rs/web" size=1 pos=0
//! [batch-ok] run="rs/web" size=1 pos=0
//! [batch-failed] run="rs/web" size=32 pos=31 failures=3 skipped=437
//! [run-aborted] run="rs/web" attempted=63 skipped=437
//! ```
//!
//! Missing fields print as `-`.

use std::fmt;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn line(e: &Event) -> String {
        let run = e.name.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("unknown");
        let (size, pos) = (Field(e.batch_size), Field(e.pos));
        match e.kind {
            EventKind::RunStarting => {
                format!("[run-starting] run={run:?} requested={}", Field(e.requested))
            }
            EventKind::RunCompleted => {
                format!("[run-completed] run={run:?} attempted={}", Field(e.attempted))
            }
            EventKind::RunAborted => format!(
                "[run-aborted] run={run:?} attempted={} skipped={}",
                Field(e.attempted),
                Field(e.skipped)
            ),
            EventKind::BatchStarting => {
                format!("[batch-starting] run={run:?} size={size} pos={pos}")
            }
            EventKind::BatchSucceeded => format!("[batch-ok] run={run:?} size={size} pos={pos}"),
            EventKind::BatchFailed => format!(
                "[batch-failed] run={run:?} size={size} pos={pos} failures={} skipped={}",
                Field(e.failures),
                Field(e.skipped)
            ),
            EventKind::ContractViolated => {
                format!("[contract-violated] run={run:?} size={size} pos={pos} err={reason}")
            }
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] subscriber={run} reason={reason}")
            }
            EventKind::SubscriberPanicked => {
                format!("[subscriber-panicked] subscriber={run} info={reason}")
            }
        }
    }
}

/// Optional count, printed bare or as `-`.
struct Field(Option<usize>);

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("-"),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::line(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
