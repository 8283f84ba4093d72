//! Memory demos: short-term events and long-term extracted records.

use agentcore_demo_core::{
    MemoryApi, PollOutcome, Relay, RelaySender, RelaySuccess, poll_bounded,
    api::{ConversationTurn, CreateMemory, MemoryDescriptor, MemoryRecord, StrategySpec},
    session::{SessionId, keys, steps},
};
use agentcore_demo_transport::{ServerMessage, sse::relay_sse};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{StepError, snippet, to_json};
use crate::{error::ApiError, state::AppState};

const STM_EXPIRY_DAYS: u32 = 7;
const LTM_EXPIRY_DAYS: u32 = 30;
const DEFAULT_ACTOR: &str = "demo_user";
const DEFAULT_PAGE: u32 = 20;
const DEFAULT_TOP_K: u32 = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/memory/create-stm-stream", get(create_stm_stream))
        .route("/api/memory/create-ltm-stream", get(create_ltm_stream))
        .route("/api/memory/initialize", post(initialize))
        .route("/api/memory/list", get(list))
        .route("/api/memory/delete", post(delete))
        .route("/api/memory/stm/turns", post(store_turns))
        .route("/api/memory/stm/events", post(list_events))
        .route("/api/memory/ltm/records", post(list_records))
        .route("/api/memory/ltm/search", post(search))
}

#[derive(Debug, Deserialize)]
struct CreateQuery {
    session_id: SessionId,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InitializeRequest {
    session_id: SessionId,
    stm_memory_id: Option<String>,
    ltm_memory_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    session_id: SessionId,
    memory_id: String,
}

#[derive(Debug, Deserialize)]
struct TurnsRequest {
    session_id: SessionId,
    memory_id: Option<String>,
    actor_id: Option<String>,
    /// Conversation the turns belong to; defaults to the client session.
    memory_session_id: Option<String>,
    turns: Vec<ConversationTurn>,
}

#[derive(Debug, Deserialize)]
struct EventsRequest {
    session_id: SessionId,
    memory_id: Option<String>,
    actor_id: Option<String>,
    memory_session_id: Option<String>,
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RecordsRequest {
    session_id: SessionId,
    memory_id: Option<String>,
    actor_id: Option<String>,
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    session_id: SessionId,
    memory_id: Option<String>,
    actor_id: Option<String>,
    query: String,
    top_k: Option<u32>,
}

fn demo_name(kind: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("AgentCore_{kind}_Demo_{}", &suffix[..8])
}

async fn create_stm_stream(
    State(state): State<AppState>,
    Query(query): Query<CreateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let guard = state.registry.begin_step(&query.session_id, steps::CREATE_STM)?;
    let request = CreateMemory {
        name: query.name.unwrap_or_else(|| demo_name("STM")),
        description: "Short-term memory for the AgentCore demo".into(),
        event_expiry_days: STM_EXPIRY_DAYS,
        strategies: vec![],
    };
    tracing::info!(session_id = %query.session_id, name = %request.name, "creating short-term memory");

    Ok(relay_sse(Relay::spawn(move |tx| async move {
        let _guard = guard;
        create_and_bind(state, tx, query.session_id, keys::STM_MEMORY_ID, request).await
    })))
}

async fn create_ltm_stream(
    State(state): State<AppState>,
    Query(query): Query<CreateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let guard = state.registry.begin_step(&query.session_id, steps::CREATE_LTM)?;
    let request = CreateMemory {
        name: query.name.unwrap_or_else(|| demo_name("LTM")),
        description: "Long-term memory with fact and preference extraction".into(),
        event_expiry_days: LTM_EXPIRY_DAYS,
        strategies: vec![StrategySpec::semantic_facts(), StrategySpec::user_preferences()],
    };
    tracing::info!(session_id = %query.session_id, name = %request.name, "creating long-term memory");

    Ok(relay_sse(Relay::spawn(move |tx| async move {
        let _guard = guard;
        create_and_bind(state, tx, query.session_id, keys::LTM_MEMORY_ID, request).await
    })))
}

fn create_request_json(request: &CreateMemory) -> Value {
    let strategies: Vec<Value> = request
        .strategies
        .iter()
        .map(|s| json!({ "type": s.kind, "name": s.name, "namespaces": s.namespaces }))
        .collect();
    json!({
        "name": request.name,
        "description": request.description,
        "eventExpiryDuration": request.event_expiry_days,
        "memoryStrategies": strategies,
    })
}

async fn create_and_bind(
    state: AppState,
    tx: RelaySender,
    session_id: SessionId,
    key: &'static str,
    request: CreateMemory,
) -> Result<RelaySuccess, StepError> {
    tx.log(format!("🧠 Creating memory {}", request.name)).await;
    tx.code(snippet("CreateMemory", &create_request_json(&request)))
        .await;

    let created = state.memory.create_memory(&request).await?;
    tx.log(format!("Memory {} accepted, status {}", created.id, created.status))
        .await;

    let policy = state.config.memory.create_policy();
    let memory = state.memory.as_ref();
    let memory_id = created.id.as_str();
    let progress = &tx;
    let outcome = poll_bounded(policy, move |attempt| {
        check_active(memory, memory_id, progress, attempt)
    })
    .await?;

    let PollOutcome::Ready(active) = outcome else {
        return Err(StepError::Failed(format!(
            "Memory {memory_id} did not become ACTIVE after {} checks",
            policy.max_attempts.max(1)
        )));
    };

    state.registry.bind(&session_id, key, active.id.clone()).await?;
    tx.log(format!("✅ Memory {} is ACTIVE", active.id)).await;

    Ok(RelaySuccess::new(format!(
        "Memory created in {:.1}s",
        tx.elapsed().as_secs_f64()
    ))
    .with("memory_id", active.id.clone())
    .with("name", active.name.clone().unwrap_or(request.name))
    .with("status", active.status.as_str())
    .with("strategies", to_json(&active.strategies))
    .with("handle", to_json(&active.handle())))
}

/// Attach existing memories to a session.
///
/// Every id is looked up before anything is bound; an unknown or failed
/// memory leaves the session untouched.
async fn initialize(
    State(state): State<AppState>,
    Json(request): Json<InitializeRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let pick = |explicit: Option<String>, fallback: &Option<String>| {
        explicit
            .filter(|id| !id.is_empty())
            .or_else(|| fallback.clone())
    };
    let wanted: Vec<(&'static str, String)> = [
        (
            keys::STM_MEMORY_ID,
            pick(request.stm_memory_id, &state.config.memory.stm_memory_id),
        ),
        (
            keys::LTM_MEMORY_ID,
            pick(request.ltm_memory_id, &state.config.memory.ltm_memory_id),
        ),
    ]
    .into_iter()
    .filter_map(|(key, id)| id.map(|id| (key, id)))
    .collect();
    if wanted.is_empty() {
        return Err(ApiError::Validation(
            "Provide stm_memory_id or ltm_memory_id".into(),
        ));
    }

    let mut found = Vec::with_capacity(wanted.len());
    for (key, memory_id) in &wanted {
        let memory = state.memory.get_memory(memory_id).await?;
        if memory.status.is_failed() {
            return Err(ApiError::Validation(format!(
                "Memory {memory_id} is {}",
                memory.status
            )));
        }
        found.push((*key, memory));
    }

    let mut reply = ServerMessage::success().message("Memories attached to session");
    let mut handles = Vec::with_capacity(found.len());
    for (key, memory) in found {
        state
            .registry
            .bind(&request.session_id, key, memory.id.clone())
            .await?;
        tracing::info!(session_id = %request.session_id, key, memory_id = %memory.id, "attached memory");
        reply = reply.with(key, memory.id.clone());
        handles.push(memory.handle());
    }
    Ok(Json(reply.with("memories", to_json(&handles))))
}

async fn check_active(
    memory: &dyn MemoryApi,
    memory_id: &str,
    tx: &RelaySender,
    attempt: u32,
) -> Result<Option<MemoryDescriptor>, StepError> {
    let current = memory.get_memory(memory_id).await?;
    if current.status.is_failed() {
        return Err(StepError::Failed(format!(
            "Memory {memory_id} entered {}",
            current.status
        )));
    }
    tx.log(format!("⏳ Check {attempt}: {}", current.status)).await;
    Ok(current.status.is_active().then_some(current))
}

/// Explicit id, or the one bound to the session under `key`.
async fn resolve_memory(
    state: &AppState,
    session_id: &str,
    explicit: Option<String>,
    key: &str,
) -> Result<String, ApiError> {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return Ok(id);
    }
    state
        .registry
        .get_str(session_id, key)
        .await?
        .ok_or_else(|| ApiError::Validation(format!("No {key} bound to session {session_id}")))
}

/// Per-actor namespaces of every strategy; the root when there are none.
fn actor_namespaces(memory: &MemoryDescriptor, actor_id: &str) -> Vec<String> {
    if memory.strategies.is_empty() {
        return vec!["/".into()];
    }
    memory
        .strategies
        .iter()
        .map(|s| format!("/strategies/{}/actors/{actor_id}", s.strategy_id))
        .collect()
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ServerMessage>, ApiError> {
    let memories = state
        .memory
        .list_memories(query.max_results.unwrap_or(DEFAULT_PAGE))
        .await?;
    Ok(Json(
        ServerMessage::success()
            .with("count", memories.len())
            .with("memories", to_json(&memories)),
    ))
}

async fn delete(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    state.memory.delete_memory(&request.memory_id).await?;
    tracing::info!(session_id = %request.session_id, memory_id = %request.memory_id, "deleted memory");

    for key in [keys::STM_MEMORY_ID, keys::LTM_MEMORY_ID] {
        let bound = state.registry.get_str(&request.session_id, key).await?;
        if bound.as_deref() == Some(request.memory_id.as_str()) {
            state.registry.unbind(&request.session_id, key).await?;
        }
    }

    Ok(Json(
        ServerMessage::success()
            .message(format!("Memory {} deleted", request.memory_id))
            .with("memory_id", request.memory_id),
    ))
}

async fn store_turns(
    State(state): State<AppState>,
    Json(request): Json<TurnsRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    if request.turns.is_empty() {
        return Err(ApiError::Validation("At least one turn is required".into()));
    }
    let memory_id = resolve_memory(
        &state,
        &request.session_id,
        request.memory_id,
        keys::STM_MEMORY_ID,
    )
    .await?;
    let actor_id = request.actor_id.unwrap_or_else(|| DEFAULT_ACTOR.into());
    let conversation = request
        .memory_session_id
        .unwrap_or_else(|| request.session_id.clone());

    let event = state
        .memory
        .create_event(&memory_id, &actor_id, &conversation, &request.turns)
        .await?;
    tracing::debug!(%memory_id, event_id = %event.event_id, turns = request.turns.len(), "stored turns");

    Ok(Json(
        ServerMessage::success()
            .message(format!("Stored {} turns", request.turns.len()))
            .with("memory_id", memory_id)
            .with("event", to_json(&event)),
    ))
}

async fn list_events(
    State(state): State<AppState>,
    Json(request): Json<EventsRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let memory_id = resolve_memory(
        &state,
        &request.session_id,
        request.memory_id,
        keys::STM_MEMORY_ID,
    )
    .await?;
    let actor_id = request.actor_id.unwrap_or_else(|| DEFAULT_ACTOR.into());
    let conversation = request
        .memory_session_id
        .unwrap_or_else(|| request.session_id.clone());

    let events = state
        .memory
        .list_events(
            &memory_id,
            &actor_id,
            &conversation,
            request.max_results.unwrap_or(DEFAULT_PAGE),
        )
        .await?;

    Ok(Json(
        ServerMessage::success()
            .with("count", events.len())
            .with("events", to_json(&events)),
    ))
}

async fn list_records(
    State(state): State<AppState>,
    Json(request): Json<RecordsRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let memory_id = resolve_memory(
        &state,
        &request.session_id,
        request.memory_id,
        keys::LTM_MEMORY_ID,
    )
    .await?;
    let actor_id = request.actor_id.unwrap_or_else(|| DEFAULT_ACTOR.into());
    let memory = state.memory.get_memory(&memory_id).await?;
    let namespaces = actor_namespaces(&memory, &actor_id);

    let mut records = Vec::new();
    for namespace in &namespaces {
        records.extend(
            state
                .memory
                .list_records(
                    &memory_id,
                    namespace,
                    request.max_results.unwrap_or(DEFAULT_PAGE),
                )
                .await?,
        );
    }

    Ok(Json(
        ServerMessage::success()
            .with("count", records.len())
            .with("namespaces", namespaces)
            .with("records", to_json(&records)),
    ))
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::Validation("Search query cannot be empty".into()));
    }
    let memory_id = resolve_memory(
        &state,
        &request.session_id,
        request.memory_id,
        keys::LTM_MEMORY_ID,
    )
    .await?;
    let actor_id = request.actor_id.unwrap_or_else(|| DEFAULT_ACTOR.into());
    let memory = state.memory.get_memory(&memory_id).await?;
    let namespaces = actor_namespaces(&memory, &actor_id);
    let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K);

    let api = state.memory.as_ref();
    let (memory_id_ref, namespaces_ref) = (memory_id.as_str(), namespaces.as_slice());
    let outcome = poll_bounded(state.config.memory.search_policy(), move |_| {
        retrieve_all(api, memory_id_ref, namespaces_ref, query, top_k)
    })
    .await?;

    let reply = ServerMessage::success().with("memory_id", memory_id.clone());
    Ok(Json(match outcome {
        PollOutcome::Ready(records) => reply
            .with("available", true)
            .with("count", records.len())
            .with("records", to_json(&records)),
        PollOutcome::NotYetAvailable { attempts } => {
            tracing::info!(%memory_id, attempts, "no extracted records yet");
            reply
                .message(
                    "No long-term records extracted yet. Extraction runs asynchronously; try again shortly.",
                )
                .with("available", false)
                .with("records", Vec::<Value>::new())
        }
    }))
}

async fn retrieve_all(
    memory: &dyn MemoryApi,
    memory_id: &str,
    namespaces: &[String],
    query: &str,
    top_k: u32,
) -> Result<Option<Vec<MemoryRecord>>, ApiError> {
    let mut found = Vec::new();
    for namespace in namespaces {
        found.extend(
            memory
                .retrieve_records(memory_id, namespace, query, top_k)
                .await?,
        );
    }
    Ok((!found.is_empty()).then_some(found))
}
