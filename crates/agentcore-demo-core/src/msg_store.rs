//! Broadcast + history store for the live server log.
//!
//! Every tracing event is captured by [`MsgStoreLayer`] and pushed here so a
//! browser that connects late still receives the most recent entries.

use std::{
    collections::VecDeque,
    fmt::Write as _,
    sync::{Arc, RwLock},
};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{Event, Level, Subscriber, field::Field};
use tracing_subscriber::{Layer, layer::Context};

/// Entries kept for late subscribers.
const HISTORY_ENTRIES: usize = 1000;

/// Upper bound on history size (10 MB).
const HISTORY_BYTES: usize = 10_000 * 1024;

/// One line of server log as shown in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// `info`, `stdout`, `stderr` or `error`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    pub data: String,
}

impl LogEntry {
    /// Build an entry for a tracing level.
    #[must_use]
    pub fn from_level(level: Level, data: impl Into<String>) -> Self {
        Self {
            kind: Self::kind_for(level).to_string(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            data: data.into(),
        }
    }

    /// UI log type for a tracing level.
    #[must_use]
    pub fn kind_for(level: Level) -> &'static str {
        match level {
            Level::ERROR => "error",
            Level::WARN => "stderr",
            Level::INFO => "info",
            _ => "stdout",
        }
    }

    fn approx_bytes(&self) -> usize {
        self.kind.len() + self.timestamp.len() + self.data.len() + 16
    }
}

struct Inner {
    history: VecDeque<(LogEntry, usize)>,
    total_bytes: usize,
}

/// Log store with broadcast and bounded history.
pub struct MsgStore {
    inner: RwLock<Inner>,
    sender: broadcast::Sender<LogEntry>,
}

impl Default for MsgStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgStore {
    /// Create a new store.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HISTORY_ENTRIES);
        Self {
            inner: RwLock::new(Inner {
                history: VecDeque::with_capacity(64),
                total_bytes: 0,
            }),
            sender,
        }
    }

    /// Push an entry to live listeners and history.
    pub fn push(&self, entry: LogEntry) {
        let _ = self.sender.send(entry.clone()); // live listeners
        let bytes = entry.approx_bytes();

        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        while inner.history.len() >= HISTORY_ENTRIES
            || inner.total_bytes.saturating_add(bytes) > HISTORY_BYTES
        {
            let Some((_, front_bytes)) = inner.history.pop_front() else {
                break;
            };
            inner.total_bytes = inner.total_bytes.saturating_sub(front_bytes);
        }
        inner.history.push_back((entry, bytes));
        inner.total_bytes = inner.total_bytes.saturating_add(bytes);
    }

    /// Get a receiver for live updates.
    #[must_use]
    pub fn get_receiver(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    /// Snapshot of the history, oldest first.
    #[must_use]
    pub fn get_history(&self) -> Vec<LogEntry> {
        self.inner
            .read()
            .map(|inner| inner.history.iter().map(|(e, _)| e.clone()).collect())
            .unwrap_or_default()
    }

    /// Stream that yields history first, then live entries.
    ///
    /// Lagged receivers skip the entries they missed.
    #[must_use]
    pub fn history_plus_stream(&self) -> futures::stream::BoxStream<'static, LogEntry> {
        let rx = self.get_receiver();
        let history = self.get_history();

        let hist = futures::stream::iter(history);
        let live = BroadcastStream::new(rx).filter_map(|res| async move { res.ok() });

        Box::pin(hist.chain(live))
    }

    /// SSE stream of log entries (requires `sse` feature).
    #[cfg(feature = "sse")]
    #[must_use]
    pub fn sse_stream(
        &self,
    ) -> futures::stream::BoxStream<'static, Result<axum::response::sse::Event, std::convert::Infallible>>
    {
        self.history_plus_stream()
            .map(|entry| {
                let event = axum::response::sse::Event::default()
                    .event("log")
                    .json_data(&entry)
                    .unwrap_or_else(|_| axum::response::sse::Event::default().data(entry.data));
                Ok(event)
            })
            .boxed()
    }
}

/// Tracing layer that mirrors events into a [`MsgStore`].
pub struct MsgStoreLayer {
    store: Arc<MsgStore>,
}

impl MsgStoreLayer {
    #[must_use]
    pub const fn new(store: Arc<MsgStore>) -> Self {
        Self { store }
    }
}

impl<S: Subscriber> Layer<S> for MsgStoreLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.store
            .push(LogEntry::from_level(level, format!("{level}: {}", visitor.line)));
    }
}

/// Flattens an event into `message key=value ...`.
#[derive(Default)]
struct LineVisitor {
    line: String,
}

impl tracing::field::Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.line.insert_str(0, value);
        } else {
            let _ = write!(self.line, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.line.insert_str(0, &format!("{value:?}"));
        } else {
            let _ = write!(self.line, " {}={value:?}", field.name());
        }
    }
}
