//! Live server log stream.

use agentcore_demo_transport::sse::log_sse;
use axum::{Router, extract::State, response::IntoResponse, routing::get};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/logs/stream", get(stream))
}

async fn stream(State(state): State<AppState>) -> impl IntoResponse {
    log_sse(&state.logs)
}
