//! Server-sent-event responses for relays and the live log.

use std::{convert::Infallible, time::Duration};

use agentcore_demo_core::{MsgStore, RelayStream};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

/// Interval between keep-alive comments on idle streams.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Serve a relay as `text/event-stream`, one SSE event per stream event.
///
/// The response ends right after the terminal `result` event.
pub fn relay_sse(stream: RelayStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = stream.map(|event| Ok(event.to_sse_event()));
    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

/// Serve the server log: buffered history followed by live entries.
///
/// The stream does not borrow `store`.
pub fn log_sse(store: &MsgStore) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    Sse::new(store.sse_stream()).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
