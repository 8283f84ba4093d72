//! Wire protocol for client-server communication.
//!
//! Relay output travels as server-sent-event frames:
//!
//! ```text
//! event: log
//! data: Creating memory...
//!
//! event: result
//! data: {"success":true,"message":"...","memory_id":"..."}
//!
//! ```
//!
//! Plain request/response endpoints answer with a [`ServerMessage`].

use agentcore_demo_core::{RelayOutcome, StreamEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Frame decoding error.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode one event as a complete frame, blank line included.
#[must_use]
pub fn encode_frame(event: &StreamEvent) -> String {
    let payload = event.payload_text();
    let mut frame = format!("event: {}\n", event.kind());
    for line in payload.replace("\r\n", "\n").split(['\r', '\n']) {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// Incremental decoder for relay frames.
///
/// Feed raw body chunks as they arrive; chunk boundaries may fall anywhere,
/// including inside a UTF-8 sequence or a `\r\n` pair. Lines end at `\r\n`,
/// a bare `\r` or `\n`.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    /// Previous line ended in `\r`; a leading `\n` belongs to it.
    after_cr: bool,
    event: Option<String>,
    data: Vec<String>,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every event it completed.
    ///
    /// # Errors
    /// Returns error if a complete line is not valid UTF-8.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>, FrameError> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();

        loop {
            if self.after_cr && !self.buf.is_empty() {
                if self.buf.first() == Some(&b'\n') {
                    self.buf.remove(0);
                }
                self.after_cr = false;
            }
            let Some(pos) = self.buf.iter().position(|b| matches!(b, b'\r' | b'\n')) else {
                break;
            };
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.after_cr = line.pop() == Some(b'\r');
            let line = String::from_utf8(line)?;
            if let Some(event) = self.feed_line(&line) {
                events.push(event);
            }
        }

        Ok(events)
    }

    /// Flush whatever the stream left unterminated.
    ///
    /// # Errors
    /// Returns error if the trailing bytes are not valid UTF-8.
    pub fn finish(mut self) -> Result<Option<StreamEvent>, FrameError> {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            let line = String::from_utf8(rest)?;
            if let Some(event) = self.feed_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(self.dispatch())
    }

    fn feed_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        let kind = self.event.take();
        if kind.is_none() && self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");

        match kind.as_deref().unwrap_or("message") {
            "log" => Some(StreamEvent::Log(data)),
            "code" => Some(StreamEvent::Code(data)),
            "result" => Some(StreamEvent::Result(
                serde_json::from_str::<RelayOutcome>(&data).unwrap_or_else(|e| {
                    RelayOutcome::failure(format!("malformed result payload: {e}"))
                }),
            )),
            other => {
                tracing::debug!(kind = other, "skipping unknown frame");
                None
            }
        }
    }
}

/// Outcome of a non-streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// JSON body of non-streaming endpoints: `{status, message, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code, e.g. `not_found`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ServerMessage {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: ReplyStatus::Success,
            message: None,
            code: None,
            body: Map::new(),
        }
    }

    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: Some(message.into()),
            code: Some(code.into()),
            body: Map::new(),
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a top-level field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_encode_multiline_log() {
        let frame = encode_frame(&StreamEvent::Log("first\nsecond".into()));
        assert_eq!(frame, "event: log\ndata: first\ndata: second\n\n");
    }

    #[test]
    fn test_decoder_handles_split_chunks_and_crlf() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"event: lo").unwrap().is_empty());
        assert!(decoder.push(b"g\r\ndata: one\r\ndata: two\r").unwrap().is_empty());
        let events = decoder.push(b"\n\r\n: keep-alive\n\n").unwrap();
        assert_eq!(events, vec![StreamEvent::Log("one\ntwo".into())]);
    }

    #[test]
    fn test_decoder_treats_bare_cr_as_line_break() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.push(b"event: log\rdata: a\rdata: b\r\r").unwrap();
        assert_eq!(events, vec![StreamEvent::Log("a\nb".into())]);

        // `\r` at the end of one chunk and `\n` at the start of the next are one break.
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"event: code\r").unwrap().is_empty());
        assert!(decoder.push(b"\ndata: x\r").unwrap().is_empty());
        let events = decoder.push(b"\n\r").unwrap();
        assert_eq!(events, vec![StreamEvent::Code("x".into())]);
        assert!(decoder.push(b"\n").unwrap().is_empty());
    }

    #[test]
    fn test_encode_splits_carriage_returns() {
        let frame = encode_frame(&StreamEvent::Log("a\rb\r\nc".into()));
        assert_eq!(frame, "event: log\ndata: a\ndata: b\ndata: c\n\n");

        let mut decoder = FrameDecoder::new();
        let events = decoder.push(frame.as_bytes()).unwrap();
        assert_eq!(events, vec![StreamEvent::Log("a\nb\nc".into())]);
    }

    #[test]
    fn test_decoder_reassembles_encoded_stream() {
        let outcome = RelayOutcome::success(
            "done",
            json!({"memory_id": "mem-1"}).as_object().cloned().unwrap(),
        );
        let body = [
            encode_frame(&StreamEvent::Code("client.create_memory(...)".into())),
            encode_frame(&StreamEvent::Result(outcome.clone())),
        ]
        .concat();

        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for chunk in body.as_bytes().chunks(7) {
            events.extend(decoder.push(chunk).unwrap());
        }
        assert!(decoder.finish().unwrap().is_none());

        assert_eq!(events.len(), 2);
        assert_eq!(events[1], StreamEvent::Result(outcome));
    }

    #[test]
    fn test_malformed_result_becomes_failure() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.push(b"event: result\ndata: {oops\n\n").unwrap();
        match &events[0] {
            StreamEvent::Result(outcome) => {
                assert!(!outcome.success);
                assert!(outcome.message.starts_with("malformed result payload"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_skipped_and_finish_flushes() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"event: ping\ndata: x\n\nevent: log\ndata: tail").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), Some(StreamEvent::Log("tail".into())));
    }

    #[test]
    fn test_server_message_shape() {
        let ok = serde_json::to_value(ServerMessage::success().with("data", json!({"a": 1}))).unwrap();
        assert_eq!(ok, json!({"status": "success", "data": {"a": 1}}));

        let err = serde_json::to_value(ServerMessage::error("not_found", "no such memory")).unwrap();
        assert_eq!(
            err,
            json!({"status": "error", "message": "no such memory", "code": "not_found"})
        );
    }
}
