//! Typed relay output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of relay output.
///
/// Events are delivered in emission order; `Result` is always last.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Human-readable progress line.
    Log(String),
    /// Source snippet showing the equivalent SDK call.
    Code(String),
    /// Terminal outcome of the relayed operation.
    Result(RelayOutcome),
}

impl StreamEvent {
    /// Kind label used on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Code(_) => "code",
            Self::Result(_) => "result",
        }
    }

    /// Whether this event ends the stream.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Result(_))
    }

    /// Payload as text: the raw line for `log`/`code`, compact JSON for `result`.
    #[must_use]
    pub fn payload_text(&self) -> String {
        match self {
            Self::Log(s) | Self::Code(s) => s.clone(),
            Self::Result(outcome) => outcome.to_json().to_string(),
        }
    }

    /// Convert to an axum SSE event named after the kind.
    #[cfg(feature = "sse")]
    #[must_use]
    pub fn to_sse_event(&self) -> axum::response::sse::Event {
        let text = self.payload_text().replace("\r\n", "\n").replace('\r', "\n");
        axum::response::sse::Event::default()
            .event(self.kind())
            .data(text)
    }
}

/// Top-level fields of a [`RelayOutcome`] that a payload may not reuse.
pub const RESERVED_FIELDS: [&str; 3] = ["success", "message", "elapsed_time"];

/// Payload key as serialized: reserved names get a `payload_` prefix.
#[must_use]
pub fn payload_key(key: String) -> String {
    if RESERVED_FIELDS.contains(&key.as_str()) {
        format!("payload_{key}")
    } else {
        key
    }
}

/// Terminal payload of a relay invocation.
///
/// Serialized flat: `success`, `message` and `elapsed_time` sit next to the
/// operation-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub elapsed_time: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl RelayOutcome {
    /// Successful outcome with a structured payload.
    ///
    /// Payload keys clashing with [`RESERVED_FIELDS`] are renamed.
    #[must_use]
    pub fn success(message: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            elapsed_time: String::new(),
            payload: payload
                .into_iter()
                .map(|(key, value)| (payload_key(key), value))
                .collect(),
        }
    }

    /// Failed outcome carrying an error description.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            elapsed_time: String::new(),
            payload: Map::new(),
        }
    }

    /// Set the elapsed time, formatted as `"{secs:.2}s"`.
    #[must_use]
    pub fn with_elapsed(mut self, elapsed: std::time::Duration) -> Self {
        self.elapsed_time = format!("{:.2}s", elapsed.as_secs_f64());
        self
    }

    /// Look up a string field of the payload.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// JSON object form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "success": self.success, "message": self.message })
        })
    }
}
