//! Code interpreter sandboxes.

use std::collections::BTreeMap;

use agentcore_demo_core::session::{SessionId, keys};
use agentcore_demo_transport::ServerMessage;
use agentcore_demo_vendor::SANDBOX_TIMEOUT;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::to_json;
use crate::{
    error::ApiError,
    state::{AppState, TrackedSandbox},
};

const SANDBOX_NAME: &str = "agentcore_demo_sandbox";
const EXECUTE_CODE: &str = "executeCode";
const EXECUTE_COMMAND: &str = "executeCommand";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/code-interpreter/execute", post(execute))
        .route("/api/code-interpreter/command", post(command))
        .route("/api/code-interpreter/reset", post(reset))
        .route("/api/code-interpreter/sessions", get(sessions))
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    session_id: SessionId,
    code: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "python".into()
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    session_id: SessionId,
    command: String,
}

/// Start a sandbox and track it for `session_id`.
async fn start_tracked(state: &AppState, session_id: &str) -> Result<String, ApiError> {
    let sandbox = state.code.start_sandbox(SANDBOX_NAME, SANDBOX_TIMEOUT).await?;
    tracing::info!(session_id, sandbox_id = %sandbox.id, "started code interpreter sandbox");

    state.sandboxes.insert(
        sandbox.id.clone(),
        TrackedSandbox {
            sandbox_id: sandbox.id.clone(),
            session_id: session_id.to_string(),
            region: state.config.aws.region.clone(),
            created_at: sandbox.created_at.unwrap_or_else(Utc::now),
            invocations: 0,
        },
    );
    state
        .registry
        .bind(session_id, keys::CODE_SESSION_ID, sandbox.id.clone())
        .await?;
    Ok(sandbox.id)
}

async fn run_tool(
    state: &AppState,
    sandbox_id: &str,
    tool: &str,
    arguments: Value,
) -> Result<Json<ServerMessage>, ApiError> {
    let output = state.code.invoke_tool(sandbox_id, tool, arguments).await?;
    if let Some(mut tracked) = state.sandboxes.get_mut(sandbox_id) {
        tracked.invocations += 1;
    }
    tracing::debug!(sandbox_id, tool, is_error = output.is_error, "tool finished");

    Ok(Json(
        ServerMessage::success()
            .with("output", output.text)
            .with("is_error", output.is_error)
            .with("sandbox_id", sandbox_id),
    ))
}

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    if request.code.trim().is_empty() {
        return Err(ApiError::Validation("Code cannot be empty".into()));
    }
    let sandbox_id = start_tracked(&state, &request.session_id).await?;
    run_tool(
        &state,
        &sandbox_id,
        EXECUTE_CODE,
        json!({ "language": request.language, "code": request.code }),
    )
    .await
}

async fn command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    if request.command.trim().is_empty() {
        return Err(ApiError::Validation("Command cannot be empty".into()));
    }
    let bound = state
        .registry
        .get_str(&request.session_id, keys::CODE_SESSION_ID)
        .await?
        .filter(|id| state.sandboxes.contains_key(id));
    let sandbox_id = match bound {
        Some(id) => id,
        None => start_tracked(&state, &request.session_id).await?,
    };
    run_tool(
        &state,
        &sandbox_id,
        EXECUTE_COMMAND,
        json!({ "command": request.command }),
    )
    .await
}

async fn reset(State(state): State<AppState>) -> Result<Json<ServerMessage>, ApiError> {
    let tracked: Vec<TrackedSandbox> = state.sandboxes.iter().map(|e| e.value().clone()).collect();
    state.sandboxes.clear();

    let mut stopped = 0usize;
    for sandbox in &tracked {
        match state.code.stop_sandbox(&sandbox.sandbox_id).await {
            Ok(()) => stopped += 1,
            Err(e) => {
                tracing::warn!(sandbox_id = %sandbox.sandbox_id, error = %e, "failed to stop sandbox");
            }
        }
        let bound = state
            .registry
            .get_str(&sandbox.session_id, keys::CODE_SESSION_ID)
            .await?;
        if bound.as_deref() == Some(sandbox.sandbox_id.as_str()) {
            state
                .registry
                .unbind(&sandbox.session_id, keys::CODE_SESSION_ID)
                .await?;
        }
    }
    tracing::info!(stopped, tracked = tracked.len(), "code interpreter reset");

    Ok(Json(
        ServerMessage::success()
            .message(format!("Reset completed. Stopped {stopped} sessions."))
            .with("stopped", stopped),
    ))
}

async fn sessions(State(state): State<AppState>) -> Json<ServerMessage> {
    let sessions: BTreeMap<String, TrackedSandbox> = state
        .sandboxes
        .iter()
        .map(|e| (e.key().clone(), e.value().clone()))
        .collect();
    Json(
        ServerMessage::success()
            .with("total_sessions", sessions.len())
            .with("sessions", to_json(&sessions)),
    )
}
