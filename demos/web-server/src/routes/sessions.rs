//! Session registry inspection.

use agentcore_demo_core::traits::SessionFilter;
use agentcore_demo_transport::ServerMessage;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use super::to_json;
use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/status", get(status))
        .route("/api/sessions/{session_id}", get(snapshot).delete(clear))
}

/// `?with_key=runtime_arn&limit=10`
#[derive(Debug, Deserialize)]
struct StatusQuery {
    with_key: Option<String>,
    limit: Option<usize>,
}

async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ServerMessage>, ApiError> {
    let filter = SessionFilter {
        with_key: query.with_key,
        limit: query.limit,
    };
    let status = state.registry.status(filter).await?;
    Ok(Json(ServerMessage::success().with("registry", to_json(&status))))
}

async fn snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ServerMessage>, ApiError> {
    let session = state.registry.snapshot(&session_id).await?;
    Ok(Json(ServerMessage::success().with("session", to_json(&session))))
}

async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ServerMessage>, ApiError> {
    let removed = state.registry.clear(&session_id).await?;
    let message = if removed {
        format!("Session {session_id} cleared")
    } else {
        format!("Session {session_id} had no bindings")
    };
    Ok(Json(
        ServerMessage::success()
            .message(message)
            .with("removed", removed),
    ))
}
