//! Event relay: run one vendor operation and stream its progress.
//!
//! A relay owns a single bounded channel. The operation writes `log`/`code`
//! events through a [`RelaySender`]; the relay task appends exactly one
//! terminal `result` event once the operation returns, fails or panics, and
//! then closes the channel.

use std::{
    fmt::Display,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use futures::Stream;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;

use crate::event::{RelayOutcome, StreamEvent, payload_key};

/// Channel capacity per relay invocation.
const RELAY_BUFFER: usize = 256;

/// Successful result of a relayed operation.
#[derive(Debug, Clone, Default)]
pub struct RelaySuccess {
    pub message: String,
    pub payload: Map<String, Value>,
}

impl RelaySuccess {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field. Reserved outcome fields get a `payload_` prefix.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(payload_key(key.into()), value.into());
        self
    }
}

/// Producer half handed to the relayed operation.
///
/// Cloneable; all clones share one underlying channel sender, which is
/// taken when the terminal event is written. Anything emitted afterwards,
/// or after the consumer went away, is discarded.
#[derive(Clone)]
pub struct RelaySender {
    tx: Arc<Mutex<Option<mpsc::Sender<StreamEvent>>>>,
    started: Instant,
}

impl RelaySender {
    fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            started: Instant::now(),
        }
    }

    /// Emit a progress line.
    pub async fn log(&self, line: impl Into<String>) {
        self.emit(StreamEvent::Log(line.into())).await;
    }

    /// Emit a code snippet.
    pub async fn code(&self, snippet: impl Into<String>) {
        self.emit(StreamEvent::Code(snippet.into())).await;
    }

    /// Time since the relay started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether further events would be dropped.
    pub async fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .await
            .as_ref()
            .is_none_or(mpsc::Sender::is_closed)
    }

    async fn emit(&self, event: StreamEvent) {
        let guard = self.tx.lock().await;
        let Some(tx) = guard.as_ref() else {
            tracing::debug!(kind = event.kind(), "relay already finished; dropping event");
            return;
        };
        if tx.send(event).await.is_err() {
            tracing::debug!("relay consumer closed; dropping event");
        }
    }

    /// Write the terminal event and close the channel.
    async fn finish(&self, outcome: RelayOutcome) {
        let mut guard = self.tx.lock().await;
        let Some(tx) = guard.take() else {
            return;
        };
        if !outcome.success {
            let _ = tx.send(StreamEvent::Log(format!("❌ {}", outcome.message))).await;
        }
        let _ = tx.send(StreamEvent::Result(outcome)).await;
    }
}

/// Entry point for relayed operations.
pub struct Relay;

impl Relay {
    /// Run `op` on the runtime and return the stream of its events.
    ///
    /// Dropping the returned stream does not cancel `op`; it only stops
    /// delivery.
    pub fn spawn<F, Fut, E>(op: F) -> RelayStream
    where
        F: FnOnce(RelaySender) -> Fut + Send + 'static,
        Fut: Future<Output = Result<RelaySuccess, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        let sender = RelaySender::new(tx);
        let finisher = sender.clone();

        tokio::spawn(async move {
            let worker = tokio::spawn(async move { op(sender).await });

            let outcome = match worker.await {
                Ok(Ok(success)) => RelayOutcome::success(success.message, success.payload),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Relayed operation failed");
                    RelayOutcome::failure(e.to_string())
                }
                Err(e) => {
                    tracing::error!(error = %e, "Relayed operation aborted");
                    RelayOutcome::failure(format!("operation aborted: {e}"))
                }
            };

            finisher.finish(outcome.with_elapsed(finisher.elapsed())).await;
        });

        RelayStream {
            inner: ReceiverStream::new(rx),
            done: false,
        }
    }
}

/// Consumer half: ordered events ending with exactly one `result`.
pub struct RelayStream {
    inner: ReceiverStream<StreamEvent>,
    done: bool,
}

impl Stream for RelayStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.done = true;
                }
                Poll::Ready(Some(event))
            }
            other => other,
        }
    }
}
