//! Wire shapes of the vendor REST/JSON API.
//!
//! Field names follow the vendor's camelCase convention; conversion into the
//! domain types in `agentcore_demo_core::api` happens here so the clients
//! never touch raw JSON.

use agentcore_demo_core::{
    ResourceStatus,
    api::{
        BrowserSession, ConversationTurn, CreateMemory, CreateRuntime, MemoryDescriptor,
        MemoryEvent, MemoryRecord, Role, RuntimeArtifact, RuntimeDescriptor, SandboxSession,
        StrategyDescriptor, StrategyKind, StrategySpec, ToolOutput,
    },
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Vendor timestamps arrive either as epoch seconds or RFC 3339 text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTime {
    Epoch(f64),
    Text(DateTime<Utc>),
}

impl WireTime {
    #[allow(clippy::cast_possible_truncation)]
    fn into_utc(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(t) => Some(t),
            Self::Epoch(secs) => Utc
                .timestamp_millis_opt((secs * 1000.0).round() as i64)
                .single(),
        }
    }
}

fn time(t: Option<WireTime>) -> Option<DateTime<Utc>> {
    t.and_then(WireTime::into_utc)
}

/// Error body; the vendor is inconsistent about capitalization.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    pub client_token: String,
    pub name: String,
    pub description: String,
    pub event_expiry_duration: u32,
    pub memory_strategies: Vec<Value>,
}

impl CreateMemoryRequest {
    #[must_use]
    pub fn from_domain(request: &CreateMemory, client_token: String) -> Self {
        Self {
            client_token,
            name: request.name.clone(),
            description: request.description.clone(),
            event_expiry_duration: request.event_expiry_days,
            memory_strategies: request.strategies.iter().map(strategy_json).collect(),
        }
    }
}

fn strategy_json(spec: &StrategySpec) -> Value {
    let key = match spec.kind {
        StrategyKind::Semantic => "semanticMemoryStrategy",
        StrategyKind::UserPreference => "userPreferenceMemoryStrategy",
        StrategyKind::Summary => "summaryMemoryStrategy",
    };
    json!({
        key: {
            "name": spec.name,
            "description": spec.description,
            "namespaces": spec.namespaces,
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStrategy {
    pub strategy_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMemory {
    pub id: String,
    pub arn: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: Option<WireTime>,
    #[serde(default)]
    pub strategies: Vec<WireStrategy>,
}

impl From<WireMemory> for MemoryDescriptor {
    fn from(m: WireMemory) -> Self {
        Self {
            id: m.id,
            arn: m.arn,
            name: m.name,
            status: m
                .status
                .as_deref()
                .map_or_else(|| ResourceStatus::Unknown(String::new()), ResourceStatus::parse),
            created_at: time(m.created_at),
            strategies: m
                .strategies
                .into_iter()
                .map(|s| StrategyDescriptor {
                    strategy_id: s.strategy_id,
                    name: s.name,
                    kind: s.kind,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MemoryEnvelope {
    pub memory: WireMemory,
}

#[derive(Debug, Deserialize)]
pub struct MemoryList {
    #[serde(default)]
    pub memories: Vec<WireMemory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireContent {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireConversational {
    pub content: WireContent,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WirePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversational: Option<WireConversational>,
}

impl From<&ConversationTurn> for WirePayload {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            conversational: Some(WireConversational {
                content: WireContent {
                    text: turn.text.clone(),
                },
                role: turn.role,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub actor_id: String,
    pub session_id: String,
    pub event_timestamp: i64,
    pub payload: Vec<WirePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    pub event_id: String,
    pub session_id: Option<String>,
    pub event_timestamp: Option<WireTime>,
    #[serde(default)]
    pub payload: Vec<WirePayload>,
}

impl From<WireEvent> for MemoryEvent {
    fn from(e: WireEvent) -> Self {
        Self {
            event_id: e.event_id,
            session_id: e.session_id,
            timestamp: time(e.event_timestamp),
            turns: e
                .payload
                .into_iter()
                .filter_map(|p| p.conversational)
                .map(|c| ConversationTurn {
                    role: c.role,
                    text: c.content.text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    pub event: WireEvent,
}

#[derive(Debug, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub events: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    pub memory_record_id: String,
    pub content: WireContent,
    #[serde(default)]
    pub namespaces: Vec<String>,
    pub created_at: Option<WireTime>,
    pub score: Option<f64>,
}

impl From<WireRecord> for MemoryRecord {
    fn from(r: WireRecord) -> Self {
        Self {
            record_id: r.memory_record_id,
            text: r.content.text,
            namespaces: r.namespaces,
            created_at: time(r.created_at),
            score: r.score,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordList {
    #[serde(default)]
    pub memory_record_summaries: Vec<WireRecord>,
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuntimeRequest {
    pub agent_runtime_name: String,
    pub agent_runtime_artifact: Value,
    pub role_arn: String,
    pub network_configuration: Value,
}

impl From<&CreateRuntime> for CreateRuntimeRequest {
    fn from(request: &CreateRuntime) -> Self {
        let artifact = match &request.artifact {
            RuntimeArtifact::Code {
                bucket,
                prefix,
                runtime,
                entry_point,
            } => json!({
                "codeConfiguration": {
                    "code": { "s3": { "bucket": bucket, "prefix": prefix } },
                    "runtime": runtime,
                    "entryPoint": entry_point,
                }
            }),
            RuntimeArtifact::Container { image_uri } => json!({
                "containerConfiguration": { "containerUri": image_uri }
            }),
        };
        Self {
            agent_runtime_name: request.name.clone(),
            agent_runtime_artifact: artifact,
            role_arn: request.role_arn.clone(),
            network_configuration: json!({ "networkMode": request.network_mode }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRuntime {
    pub agent_runtime_id: String,
    pub agent_runtime_arn: String,
    pub agent_runtime_version: String,
    pub status: Option<String>,
    pub created_at: Option<WireTime>,
    pub last_updated_at: Option<WireTime>,
}

impl From<WireRuntime> for RuntimeDescriptor {
    fn from(r: WireRuntime) -> Self {
        Self {
            id: r.agent_runtime_id,
            arn: r.agent_runtime_arn,
            version: r.agent_runtime_version,
            status: r
                .status
                .as_deref()
                .map_or_else(|| ResourceStatus::Unknown(String::new()), ResourceStatus::parse),
            created_at: time(r.created_at),
            updated_at: time(r.last_updated_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Sandboxes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub name: String,
    pub session_timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStream {
    pub stream_endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStreams {
    pub live_view_stream: Option<WireStream>,
    pub automation_stream: Option<WireStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: String,
    pub created_at: Option<WireTime>,
    #[serde(default)]
    pub streams: Option<WireStreams>,
}

impl From<StartSessionResponse> for SandboxSession {
    fn from(r: StartSessionResponse) -> Self {
        Self {
            id: r.session_id,
            created_at: time(r.created_at),
        }
    }
}

impl From<StartSessionResponse> for BrowserSession {
    fn from(r: StartSessionResponse) -> Self {
        let streams = r.streams.unwrap_or_default();
        Self {
            id: r.session_id,
            live_view_endpoint: streams.live_view_stream.and_then(|s| s.stream_endpoint),
            automation_endpoint: streams.automation_stream.and_then(|s| s.stream_endpoint),
            created_at: time(r.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvokeToolRequest<'a> {
    pub name: &'a str,
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
pub struct InvokeToolResponse {
    #[serde(default)]
    pub result: ToolResult,
}

impl From<InvokeToolResponse> for ToolOutput {
    fn from(r: InvokeToolResponse) -> Self {
        let text = r
            .result
            .content
            .iter()
            .filter(|c| c.kind == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            text: text.trim().to_string(),
            is_error: r.result.is_error,
        }
    }
}
