//! HTTP routes.

pub mod browser;
pub mod code_interpreter;
pub mod logs;
pub mod memory;
pub mod runtime;
pub mod sessions;

use agentcore_demo_core::VendorError;
use agentcore_demo_session::RegistryError;
use agentcore_demo_transport::ServerMessage;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Failure inside a relayed step; becomes the terminal result's message.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("{0}")]
    Vendor(#[from] VendorError),
    #[error("{0}")]
    Registry(#[from] RegistryError),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Failed(String),
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(public_config))
        .merge(sessions::routes())
        .merge(logs::routes())
        .merge(memory::routes())
        .merge(runtime::routes())
        .merge(code_interpreter::routes())
        .merge(browser::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn public_config(State(state): State<AppState>) -> Json<ServerMessage> {
    Json(ServerMessage::success().with("config", to_json(&state.config.public_view())))
}

/// Serialize a response fragment; unserializable values become `null`.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Pretty JSON for code snippets shown next to the logs.
pub(crate) fn snippet(title: &str, body: &Value) -> String {
    let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
    format!("{title}\n{pretty}")
}
