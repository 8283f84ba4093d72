//! Agent runtime lifecycle: deploy, status, invoke, cleanup.

use std::{path::PathBuf, time::Instant};

use agentcore_demo_core::{
    Relay, RelaySender, RelaySuccess, ResourceStatus,
    api::{CreateRuntime, RuntimeArtifact},
    session::{SessionId, keys, steps},
};
use agentcore_demo_transport::{ServerMessage, sse::relay_sse};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{StepError, snippet, to_json};
use crate::{error::ApiError, state::AppState};

pub const MAX_PROMPT_CHARS: usize = 10_000;
pub const MIN_RUNTIME_SESSION_ID_LEN: usize = 33;
const MAX_AGENT_NAME_LEN: usize = 48;
const PYTHON_RUNTIME: &str = "PYTHON_3_13";
const ENTRY_POINT: &str = "main.py";
const PACKAGE_FILE: &str = "deployment_package.zip";
const NETWORK_MODE: &str = "PUBLIC";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/runtime/deploy-stream", get(deploy_stream))
        .route("/api/runtime/status", post(status))
        .route("/api/runtime/invoke", post(invoke))
        .route("/api/runtime/cleanup", post(cleanup))
        .route("/api/runtime/session/{session_id}", get(session_info))
}

/// How the agent is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentType {
    Code,
    Container,
}

impl DeploymentType {
    /// Parse `code` / `container`; anything else is a validation error.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` for unknown values.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("code") {
            "code" => Ok(Self::Code),
            "container" => Ok(Self::Container),
            other => Err(ApiError::Validation(format!(
                "deployment_type must be \"code\" or \"container\", got \"{other}\""
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Container => "container",
        }
    }

    /// Request body shape the deployed agent expects.
    #[must_use]
    pub fn payload(self, prompt: &str) -> Value {
        match self {
            Self::Code => json!({ "prompt": prompt }),
            Self::Container => json!({ "input": { "prompt": prompt } }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeployQuery {
    session_id: SessionId,
    deployment_type: Option<String>,
    agent_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    session_id: SessionId,
    runtime_id: Option<String>,
    runtime_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvokeRequest {
    session_id: SessionId,
    runtime_arn: Option<String>,
    runtime_session_id: String,
    prompt: String,
    deployment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CleanupRequest {
    session_id: SessionId,
    runtime_id: String,
}

/// Where the runtime's code comes from, resolved before the relay starts.
enum DeployPlan {
    Code {
        package: PathBuf,
        bucket: String,
        key: String,
        role_arn: String,
    },
    Container {
        image_uri: String,
        role_arn: String,
    },
}

fn validate_agent_name(name: &str) -> Result<(), ApiError> {
    let mut chars = name.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if starts_alpha && rest_ok && name.len() <= MAX_AGENT_NAME_LEN {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "agent_name must start with a letter, contain only letters, digits and '_', and be at most {MAX_AGENT_NAME_LEN} characters"
        )))
    }
}

fn resolve_plan(state: &AppState, kind: DeploymentType, agent_name: &str) -> Result<DeployPlan, ApiError> {
    let aws = &state.config.aws;
    let runtime = &state.config.runtime;
    match kind {
        DeploymentType::Code => Ok(DeployPlan::Code {
            package: runtime.deployment_package_path.clone(),
            bucket: runtime
                .bucket(aws)
                .ok_or_else(|| ApiError::Config("runtime.s3_bucket or aws.account_id must be set".into()))?,
            key: format!("{agent_name}/{PACKAGE_FILE}"),
            role_arn: runtime.role_arn(aws).ok_or_else(|| {
                ApiError::Config("runtime.execution_role_arn or aws.account_id must be set".into())
            })?,
        }),
        DeploymentType::Container => Ok(DeployPlan::Container {
            image_uri: runtime.container_image_uri(aws).ok_or_else(|| {
                ApiError::Config("aws.account_id and runtime.container_repository must be set".into())
            })?,
            role_arn: runtime
                .container_role_arn
                .clone()
                .or_else(|| runtime.role_arn(aws))
                .ok_or_else(|| ApiError::Config("runtime.container_role_arn must be set".into()))?,
        }),
    }
}

async fn deploy_stream(
    State(state): State<AppState>,
    Query(query): Query<DeployQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = DeploymentType::parse(query.deployment_type.as_deref())?;
    let agent_name = match query.agent_name.filter(|n| !n.is_empty()) {
        Some(name) => {
            validate_agent_name(&name)?;
            name
        }
        None => format!(
            "{}_demo_{}",
            if kind == DeploymentType::Code { "runtime" } else { "container" },
            chrono::Utc::now().timestamp()
        ),
    };
    let plan = resolve_plan(&state, kind, &agent_name)?;
    let guard = state.registry.begin_step(&query.session_id, steps::DEPLOY)?;
    tracing::info!(session_id = %query.session_id, %agent_name, deployment_type = kind.as_str(), "deploying runtime");

    Ok(relay_sse(Relay::spawn(move |tx| async move {
        let _guard = guard;
        deploy(state, tx, query.session_id, agent_name, plan).await
    })))
}

fn create_request_json(request: &CreateRuntime) -> Value {
    let artifact = match &request.artifact {
        RuntimeArtifact::Code {
            bucket,
            prefix,
            runtime,
            entry_point,
        } => json!({ "codeConfiguration": {
            "code": { "s3": { "bucket": bucket, "prefix": prefix } },
            "runtime": runtime,
            "entryPoint": entry_point,
        }}),
        RuntimeArtifact::Container { image_uri } => {
            json!({ "containerConfiguration": { "containerUri": image_uri } })
        }
    };
    json!({
        "agentRuntimeName": request.name,
        "agentRuntimeArtifact": artifact,
        "roleArn": request.role_arn,
        "networkConfiguration": { "networkMode": request.network_mode },
    })
}

async fn deploy(
    state: AppState,
    tx: RelaySender,
    session_id: SessionId,
    agent_name: String,
    plan: DeployPlan,
) -> Result<RelaySuccess, StepError> {
    let (artifact, role_arn, artifact_key) = match plan {
        DeployPlan::Code {
            package,
            bucket,
            key,
            role_arn,
        } => {
            tx.log(format!("📦 Reading deployment package {}", package.display()))
                .await;
            let body = tokio::fs::read(&package).await.map_err(|e| {
                StepError::Config(format!("Cannot read {}: {e}", package.display()))
            })?;
            tx.log(format!("⬆️ Uploading {} bytes to s3://{bucket}/{key}", body.len()))
                .await;
            state
                .artifacts
                .put_object(&bucket, &key, Bytes::from(body))
                .await?;
            tx.log("Upload complete").await;
            let artifact = RuntimeArtifact::Code {
                bucket,
                prefix: key.clone(),
                runtime: PYTHON_RUNTIME.into(),
                entry_point: vec![ENTRY_POINT.into()],
            };
            (artifact, role_arn, Some(key))
        }
        DeployPlan::Container {
            image_uri,
            role_arn,
        } => {
            tx.log(format!("🐳 Deploying container image {image_uri}"))
                .await;
            (RuntimeArtifact::Container { image_uri }, role_arn, None)
        }
    };

    let request = CreateRuntime {
        name: agent_name,
        artifact,
        role_arn,
        network_mode: NETWORK_MODE.into(),
    };
    tx.code(snippet("CreateAgentRuntime", &create_request_json(&request)))
        .await;
    tx.log(format!("🚀 Creating runtime {}", request.name)).await;

    let runtime = match state.runtime.create_runtime(&request).await {
        Ok(runtime) => runtime,
        Err(e) => {
            if let (Some(key), RuntimeArtifact::Code { bucket, .. }) =
                (&artifact_key, &request.artifact)
            {
                tx.log(format!("🧹 Removing uploaded package s3://{bucket}/{key}"))
                    .await;
                remove_package(&state, bucket, key).await;
            }
            return Err(e.into());
        }
    };
    let deployment_type = request.artifact.deployment_type();
    tx.log(format!(
        "Runtime {} version {} is {}",
        runtime.id, runtime.version, runtime.status
    ))
    .await;

    let bindings = [
        (keys::RUNTIME_ARN, runtime.arn.clone()),
        (keys::RUNTIME_ID, runtime.id.clone()),
        (keys::RUNTIME_VERSION, runtime.version.clone()),
        (keys::AGENT_NAME, request.name.clone()),
        (keys::DEPLOYMENT_TYPE, deployment_type.to_string()),
    ];
    for (key, value) in bindings {
        state.registry.bind(&session_id, key, value).await?;
    }
    if let Some(key) = &artifact_key {
        state
            .registry
            .bind(&session_id, keys::ARTIFACT_KEY, key.clone())
            .await?;
    }

    Ok(RelaySuccess::new(format!(
        "Runtime deployed in {:.1}s",
        tx.elapsed().as_secs_f64()
    ))
    .with("handle", to_json(&runtime.handle()))
    .with("runtime_arn", runtime.arn)
    .with("runtime_id", runtime.id)
    .with("runtime_version", runtime.version)
    .with("status", runtime.status.as_str())
    .with("agent_name", request.name)
    .with("deployment_type", deployment_type))
}

async fn status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    let runtime_id = match request.runtime_id {
        Some(id) => id,
        None => state
            .registry
            .get_str(&request.session_id, keys::RUNTIME_ID)
            .await?
            .ok_or_else(|| ApiError::Validation("runtime_id is required".into()))?,
    };
    let version = match request.runtime_version {
        Some(version) => version,
        None => state
            .registry
            .get_str(&request.session_id, keys::RUNTIME_VERSION)
            .await?
            .unwrap_or_else(|| "1".into()),
    };

    let runtime = state.runtime.get_runtime(&runtime_id, &version).await?;
    tracing::info!(%runtime_id, status = %runtime.status, "runtime status");

    Ok(Json(
        ServerMessage::success()
            .with("runtime_status", runtime.status.as_str())
            .with("handle", to_json(&runtime.handle()))
            .with("details", to_json(&runtime)),
    ))
}

async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::Validation("Prompt cannot be empty".into()));
    }
    if request.prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiError::Validation(format!(
            "Prompt cannot exceed {MAX_PROMPT_CHARS} characters"
        )));
    }
    if request.runtime_session_id.chars().count() < MIN_RUNTIME_SESSION_ID_LEN {
        return Err(ApiError::Validation(format!(
            "runtime_session_id must be at least {MIN_RUNTIME_SESSION_ID_LEN} characters"
        )));
    }
    let kind = DeploymentType::parse(request.deployment_type.as_deref())?;

    let runtime_arn = match request.runtime_arn.filter(|arn| !arn.is_empty()) {
        Some(arn) => arn,
        None => state
            .registry
            .get_str(&request.session_id, keys::RUNTIME_ARN)
            .await?
            .ok_or_else(|| ApiError::Validation("runtime_arn is required".into()))?,
    };

    tracing::info!(
        session_id = %request.session_id,
        %runtime_arn,
        deployment_type = kind.as_str(),
        prompt_len = request.prompt.len(),
        "invoking runtime"
    );
    let started = Instant::now();
    let response = state
        .runtime
        .invoke_runtime(
            &runtime_arn,
            &request.runtime_session_id,
            &kind.payload(&request.prompt),
        )
        .await?;
    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(elapsed, "runtime responded");

    Ok(Json(
        ServerMessage::success()
            .with("response", response)
            .with("execution_time", format!("{elapsed:.2}s"))
            .with("prompt", request.prompt)
            .with("deployment_type", kind.as_str()),
    ))
}

async fn cleanup(
    State(state): State<AppState>,
    Json(request): Json<CleanupRequest>,
) -> Result<Json<ServerMessage>, ApiError> {
    state.runtime.delete_runtime(&request.runtime_id).await?;
    tracing::info!(session_id = %request.session_id, runtime_id = %request.runtime_id, "runtime deletion requested");

    let bound = state
        .registry
        .get_str(&request.session_id, keys::RUNTIME_ID)
        .await?;
    if bound.as_deref() == Some(request.runtime_id.as_str()) {
        let artifact_key = state
            .registry
            .get_str(&request.session_id, keys::ARTIFACT_KEY)
            .await?;
        if let (Some(key), Some(bucket)) = (
            artifact_key,
            state.config.runtime.bucket(&state.config.aws),
        ) {
            remove_package(&state, &bucket, &key).await;
        }
        for key in keys::RUNTIME_KEYS {
            state.registry.unbind(&request.session_id, key).await?;
        }
    }

    Ok(Json(
        ServerMessage::success()
            .message(format!("Runtime {} deleted", request.runtime_id))
            .with("runtime_id", request.runtime_id),
    ))
}

/// Delete an uploaded package; failure is only logged.
async fn remove_package(state: &AppState, bucket: &str, key: &str) {
    if let Err(e) = state.artifacts.delete_object(bucket, key).await {
        tracing::warn!(bucket, key, error = %e, "failed to delete deployment package");
    }
}

async fn session_info(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ServerMessage>, ApiError> {
    let session = state.registry.snapshot(&session_id).await?;
    if session.get(keys::RUNTIME_ARN).is_none() {
        return Ok(Json(
            ServerMessage::success()
                .message("No runtime found for this session")
                .with("lifecycle", ResourceStatus::lifecycle_label(None))
                .with("data", Value::Null),
        ));
    }

    let data: Map<String, Value> = keys::RUNTIME_KEYS
        .iter()
        .filter_map(|key| session.get(key).map(|v| ((*key).to_string(), v.clone())))
        .collect();
    Ok(Json(ServerMessage::success().with("data", data)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        routes::tests::{send_json, stream_events, terminal, test_config, test_state},
        testing::Lifecycle,
    };

    const RUNTIME_SESSION: &str = "0f6d1d3e-5a2b-4c8e-9f1a-2b3c4d5e6f70";

    fn container_config() -> AppConfig {
        let mut config = test_config();
        config.aws.account_id = Some("123456789012".into());
        config.runtime.container_repository = Some("demo-agent".into());
        config.runtime.container_role_arn = Some("arn:aws:iam::123456789012:role/demo".into());
        config
    }

    fn invoke_body(runtime_session_id: &str, prompt: &str, deployment_type: &str) -> Value {
        json!({
            "session_id": "tab-1",
            "runtime_arn": "arn:fake:runtime/r-1",
            "runtime_session_id": runtime_session_id,
            "prompt": prompt,
            "deployment_type": deployment_type,
        })
    }

    #[tokio::test]
    async fn test_invoke_rejects_bad_input_before_vendor_call() {
        let (state, vendor) = test_state(test_config());
        let cases = [
            invoke_body("too-short", "hello", "code"),
            invoke_body(RUNTIME_SESSION, "   ", "code"),
            invoke_body(RUNTIME_SESSION, &"x".repeat(MAX_PROMPT_CHARS + 1), "code"),
            invoke_body(RUNTIME_SESSION, "hello", "lambda"),
        ];
        for body in cases {
            let (status, reply) =
                send_json(&state, Method::POST, "/api/runtime/invoke", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{reply}");
            assert_eq!(reply["code"], "validation");
        }
        assert!(vendor.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_payload_shape_follows_deployment_type() {
        let (state, vendor) = test_state(test_config());
        let (status, reply) = send_json(
            &state,
            Method::POST,
            "/api/runtime/invoke",
            Some(invoke_body(RUNTIME_SESSION, "hello", "container")),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{reply}");
        assert_eq!(reply["response"]["result"], "echo");
        send_json(
            &state,
            Method::POST,
            "/api/runtime/invoke",
            Some(invoke_body(RUNTIME_SESSION, "hello", "code")),
        )
        .await;

        assert_eq!(
            vendor.invocations(),
            vec![
                json!({"input": {"prompt": "hello"}}),
                json!({"prompt": "hello"})
            ]
        );
    }

    #[tokio::test]
    async fn test_container_deploy_then_cleanup() {
        let (state, _) = test_state(container_config());
        let (status, events) = stream_events(
            &state,
            "/api/runtime/deploy-stream?session_id=tab-1&deployment_type=container&agent_name=my_agent",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let outcome = terminal(&events);
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.get_str("deployment_type"), Some("container"));
        assert_eq!(outcome.get_str("agent_name"), Some("my_agent"));
        let runtime_id = outcome.get_str("runtime_id").unwrap().to_string();

        let (_, info) = send_json(&state, Method::GET, "/api/runtime/session/tab-1", None).await;
        assert_eq!(info["data"]["runtime_id"], runtime_id.as_str());
        assert!(info["data"].get("artifact_key").is_none());

        let (status, reply) = send_json(
            &state,
            Method::POST,
            "/api/runtime/status",
            Some(json!({"session_id": "tab-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["runtime_status"], "ACTIVE");

        let (status, _) = send_json(
            &state,
            Method::POST,
            "/api/runtime/cleanup",
            Some(json!({"session_id": "tab-1", "runtime_id": runtime_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, info) = send_json(&state, Method::GET, "/api/runtime/session/tab-1", None).await;
        assert_eq!(info["data"], Value::Null);
        assert_eq!(info["message"], "No runtime found for this session");
        assert_eq!(info["lifecycle"], "UNCREATED");
    }

    /// Code-deploy config over a freshly written package; returns the
    /// package directory for removal.
    fn code_config() -> (AppConfig, PathBuf) {
        let dir = std::env::temp_dir().join(format!("agentcore-demo-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let package = dir.join("deployment_package.zip");
        std::fs::write(&package, b"PK\x03\x04demo").unwrap();

        let mut config = test_config();
        config.runtime.deployment_package_path = package;
        config.runtime.s3_bucket = Some("demo-bucket".into());
        config.runtime.execution_role_arn = Some("arn:aws:iam::1:role/exec".into());
        (config, dir)
    }

    #[tokio::test]
    async fn test_rejected_create_removes_package_and_binds_nothing() {
        let (config, dir) = code_config();
        let (state, vendor) = test_state(config);
        vendor.set_lifecycle(Lifecycle::RejectsCreate);

        let (status, events) = stream_events(
            &state,
            "/api/runtime/deploy-stream?session_id=tab-1&agent_name=code_agent",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let outcome = terminal(&events);
        assert!(!outcome.success);
        assert!(outcome.message.contains("quota exceeded"), "{}", outcome.message);
        assert!(vendor.objects().is_empty());
        for key in keys::RUNTIME_KEYS {
            assert_eq!(state.registry.get_str("tab-1", key).await.unwrap(), None, "{key}");
        }
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_status_reports_vendor_state_and_handle() {
        let (state, vendor) = test_state(container_config());
        vendor.set_lifecycle(Lifecycle::StuckCreating);
        let (_, events) = stream_events(
            &state,
            "/api/runtime/deploy-stream?session_id=tab-1&deployment_type=container&agent_name=slow_agent",
        )
        .await;
        let outcome = terminal(&events);
        assert_eq!(outcome.payload["handle"]["kind"], "runtime");
        assert_eq!(outcome.payload["handle"]["status"], "CREATING");

        let (status, reply) = send_json(
            &state,
            Method::POST,
            "/api/runtime/status",
            Some(json!({"session_id": "tab-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["runtime_status"], "CREATING");
        assert_eq!(reply["handle"]["id"], outcome.payload["runtime_id"]);
    }

    #[tokio::test]
    async fn test_code_deploy_uploads_and_cleanup_removes_package() {
        let (config, dir) = code_config();
        let (state, vendor) = test_state(config);

        let (_, events) = stream_events(
            &state,
            "/api/runtime/deploy-stream?session_id=tab-1&agent_name=code_agent",
        )
        .await;
        let outcome = terminal(&events);
        assert!(outcome.success, "{}", outcome.message);
        assert!(
            vendor
                .objects()
                .contains("demo-bucket/code_agent/deployment_package.zip")
        );
        assert_eq!(
            state.registry.get_str("tab-1", keys::ARTIFACT_KEY).await.unwrap().as_deref(),
            Some("code_agent/deployment_package.zip")
        );

        let runtime_id = outcome.get_str("runtime_id").unwrap();
        send_json(
            &state,
            Method::POST,
            "/api/runtime/cleanup",
            Some(json!({"session_id": "tab-1", "runtime_id": runtime_id})),
        )
        .await;
        assert!(vendor.objects().is_empty());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_package_fails_relay() {
        let mut config = test_config();
        config.runtime.deployment_package_path = PathBuf::from("/nonexistent/package.zip");
        config.runtime.s3_bucket = Some("demo-bucket".into());
        config.runtime.execution_role_arn = Some("arn:aws:iam::1:role/exec".into());
        let (state, _) = test_state(config);

        let (_, events) =
            stream_events(&state, "/api/runtime/deploy-stream?session_id=tab-1").await;
        let outcome = terminal(&events);
        assert!(!outcome.success);
        assert!(outcome.message.contains("/nonexistent/package.zip"));
        assert!(!state.registry.is_running("tab-1", steps::DEPLOY));
    }

    #[tokio::test]
    async fn test_code_deploy_without_bucket_is_not_configured() {
        let (state, _) = test_state(test_config());
        let (status, reply) =
            send_json(&state, Method::GET, "/api/runtime/deploy-stream?session_id=tab-1", None)
                .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(reply["code"], "not_configured");
    }

    #[tokio::test]
    async fn test_cleanup_unknown_runtime_is_not_found() {
        let (state, _) = test_state(test_config());
        let (status, reply) = send_json(
            &state,
            Method::POST,
            "/api/runtime/cleanup",
            Some(json!({"session_id": "tab-1", "runtime_id": "missing"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(reply["status"], "error");
        assert_eq!(reply["code"], "not_found");
    }

    #[test]
    fn test_agent_name_rules() {
        assert!(validate_agent_name("demo_agent_1").is_ok());
        assert!(validate_agent_name("1agent").is_err());
        assert!(validate_agent_name("has-dash").is_err());
        assert!(validate_agent_name(&"a".repeat(MAX_AGENT_NAME_LEN + 1)).is_err());
    }
}
