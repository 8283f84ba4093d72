//! Agent runtime and deployment artifact calls.

use agentcore_demo_core::{
    ArtifactStore, RuntimeApi, VendorError,
    api::{CreateRuntime, RuntimeDescriptor},
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde_json::{Value, json};

use super::{
    client::{HttpVendor, Plane},
    protocol::{CreateRuntimeRequest, WireRuntime},
};

/// Header carrying the runtime session id on invocations.
pub const RUNTIME_SESSION_HEADER: &str = "X-Amzn-Bedrock-AgentCore-Runtime-Session-Id";

#[async_trait]
impl RuntimeApi for HttpVendor {
    async fn create_runtime(&self, request: &CreateRuntime) -> Result<RuntimeDescriptor, VendorError> {
        let url = self.url(Plane::Control, &["runtimes"])?;
        tracing::info!(
            name = %request.name,
            deployment_type = request.artifact.deployment_type(),
            "creating agent runtime"
        );

        let runtime: WireRuntime = self
            .send_json(
                self.request(Method::PUT, url)
                    .json(&CreateRuntimeRequest::from(request)),
            )
            .await?;
        Ok(runtime.into())
    }

    async fn get_runtime(&self, runtime_id: &str, version: &str) -> Result<RuntimeDescriptor, VendorError> {
        let url = self.url(Plane::Control, &["runtimes", runtime_id])?;
        let runtime: WireRuntime = self
            .send_json(
                self.request(Method::GET, url)
                    .query(&[("version", version)]),
            )
            .await?;
        Ok(runtime.into())
    }

    async fn invoke_runtime(
        &self,
        runtime_arn: &str,
        runtime_session_id: &str,
        payload: &Value,
    ) -> Result<Value, VendorError> {
        let url = self.url(Plane::Data, &["runtimes", runtime_arn, "invocations"])?;
        let response = self
            .send(
                self.request(Method::POST, url)
                    .query(&[("qualifier", "DEFAULT")])
                    .header(RUNTIME_SESSION_HEADER, runtime_session_id)
                    .json(payload),
            )
            .await?;

        let text = response
            .text()
            .await
            .map_err(|e| VendorError::Network(e.to_string()))?;

        // Agents may answer with plain text instead of JSON.
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "response": text })))
    }

    async fn delete_runtime(&self, runtime_id: &str) -> Result<(), VendorError> {
        let url = self.url(Plane::Control, &["runtimes", runtime_id])?;
        tracing::info!(runtime_id, "deleting agent runtime");
        self.send_empty(self.request(Method::DELETE, url)).await
    }
}

/// Path-style object storage: `{artifact_endpoint}/{bucket}/{key}`.
#[async_trait]
impl ArtifactStore for HttpVendor {
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), VendorError> {
        let mut segments = vec![bucket];
        segments.extend(key.split('/'));
        let url = self.url(Plane::Artifact, &segments)?;
        tracing::info!(bucket, key, size = body.len(), "uploading artifact");

        self.send_empty(
            self.request(Method::PUT, url)
                .header(reqwest::header::CONTENT_TYPE, "application/zip")
                .body(body),
        )
        .await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), VendorError> {
        let mut segments = vec![bucket];
        segments.extend(key.split('/'));
        let url = self.url(Plane::Artifact, &segments)?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }
}
