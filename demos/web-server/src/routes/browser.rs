//! Browser sandboxes.

use agentcore_demo_core::session::{SessionId, keys};
use agentcore_demo_transport::ServerMessage;
use agentcore_demo_vendor::SANDBOX_TIMEOUT;
use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

const BROWSER_NAME: &str = "agentcore_demo_browser";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/browser/start", post(start))
        .route("/api/browser/stop", post(stop))
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    session_id: SessionId,
}

#[derive(Debug, Deserialize)]
struct StopRequest {
    session_id: SessionId,
    browser_session_id: Option<String>,
}

async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let browser = state.browser.start_browser(BROWSER_NAME, SANDBOX_TIMEOUT).await?;
    state
        .registry
        .bind(&request.session_id, keys::BROWSER_SESSION_ID, browser.id.clone())
        .await?;
    tracing::info!(session_id = %request.session_id, browser_session_id = %browser.id, "browser started");

    let mut reply = ServerMessage::success()
        .message("Browser session started")
        .with("browser_session_id", browser.id);
    if let Some(url) = browser.live_view_endpoint {
        reply = reply.with("live_view_endpoint", url);
    }
    if let Some(url) = browser.automation_endpoint {
        reply = reply.with("automation_endpoint", url);
    }
    Ok(Json(reply))
}

async fn stop(
    State(state): State<AppState>,
    Json(request): Json<StopRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let bound = state
        .registry
        .get_str(&request.session_id, keys::BROWSER_SESSION_ID)
        .await?;
    let Some(browser_id) = request.browser_session_id.or_else(|| bound.clone()) else {
        return Err(ApiError::NotFound(format!(
            "No browser session for {}",
            request.session_id
        )));
    };

    state.browser.stop_browser(&browser_id).await?;
    if bound.as_deref() == Some(browser_id.as_str()) {
        state
            .registry
            .unbind(&request.session_id, keys::BROWSER_SESSION_ID)
            .await?;
    }
    tracing::info!(session_id = %request.session_id, browser_session_id = %browser_id, "browser stopped");

    Ok(Json(
        ServerMessage::success()
            .message("Browser session stopped")
            .with("browser_session_id", browser_id),
    ))
}
