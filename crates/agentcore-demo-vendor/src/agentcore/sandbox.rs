//! Code interpreter and browser sandbox calls.

use std::time::Duration;

use agentcore_demo_core::{
    BrowserApi, CodeInterpreterApi, VendorError,
    api::{BrowserSession, SandboxSession, ToolOutput},
};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::{
    client::{HttpVendor, Plane},
    protocol::{InvokeToolRequest, StartSessionRequest, StartSessionResponse, InvokeToolResponse},
};

/// Managed code interpreter identifier.
pub const CODE_INTERPRETER_ID: &str = "aws.codeinterpreter.v1";
/// Managed browser identifier.
pub const BROWSER_ID: &str = "aws.browser.v1";
/// Session timeout used for both sandbox kinds.
pub const SANDBOX_TIMEOUT: Duration = Duration::from_secs(900);

const CODE_SESSION_HEADER: &str = "x-amzn-code-interpreter-session-id";
const BROWSER_SESSION_HEADER: &str = "x-amzn-browser-session-id";

impl HttpVendor {
    async fn start_sandbox_session(
        &self,
        family: &str,
        identifier: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<StartSessionResponse, VendorError> {
        let url = self.url(Plane::Data, &[family, identifier, "sessions", "start"])?;
        let body = StartSessionRequest {
            name: name.to_string(),
            session_timeout_seconds: timeout.as_secs(),
        };
        self.send_json(self.request(Method::PUT, url).json(&body))
            .await
    }

    async fn stop_sandbox_session(
        &self,
        family: &str,
        identifier: &str,
        header: &str,
        session_id: &str,
    ) -> Result<(), VendorError> {
        let url = self.url(Plane::Data, &[family, identifier, "sessions", "stop"])?;
        self.send_empty(self.request(Method::PUT, url).header(header, session_id))
            .await
    }
}

#[async_trait]
impl CodeInterpreterApi for HttpVendor {
    async fn start_sandbox(&self, name: &str, timeout: Duration) -> Result<SandboxSession, VendorError> {
        let started = self
            .start_sandbox_session("code-interpreters", CODE_INTERPRETER_ID, name, timeout)
            .await?;
        tracing::info!(session_id = %started.session_id, "started code interpreter");
        Ok(started.into())
    }

    async fn invoke_tool(
        &self,
        session_id: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolOutput, VendorError> {
        let url = self.url(
            Plane::Data,
            &["code-interpreters", CODE_INTERPRETER_ID, "tools", "invoke"],
        )?;
        let response: InvokeToolResponse = self
            .send_json(
                self.request(Method::POST, url)
                    .header(CODE_SESSION_HEADER, session_id)
                    .json(&InvokeToolRequest {
                        name: tool,
                        arguments,
                    }),
            )
            .await?;
        Ok(response.into())
    }

    async fn stop_sandbox(&self, session_id: &str) -> Result<(), VendorError> {
        tracing::info!(session_id, "stopping code interpreter");
        self.stop_sandbox_session(
            "code-interpreters",
            CODE_INTERPRETER_ID,
            CODE_SESSION_HEADER,
            session_id,
        )
        .await
    }
}

#[async_trait]
impl BrowserApi for HttpVendor {
    async fn start_browser(&self, name: &str, timeout: Duration) -> Result<BrowserSession, VendorError> {
        let started = self
            .start_sandbox_session("browsers", BROWSER_ID, name, timeout)
            .await?;
        tracing::info!(session_id = %started.session_id, "started browser");
        Ok(started.into())
    }

    async fn stop_browser(&self, session_id: &str) -> Result<(), VendorError> {
        tracing::info!(session_id, "stopping browser");
        self.stop_sandbox_session("browsers", BROWSER_ID, BROWSER_SESSION_HEADER, session_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;
    use crate::VendorConfig;

    fn vendor(server: &MockServer) -> HttpVendor {
        HttpVendor::new(&VendorConfig::default().single_endpoint(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_execute_code_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/code-interpreters/aws.codeinterpreter.v1/sessions/start"))
            .and(body_partial_json(json!({ "sessionTimeoutSeconds": 900 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessionId": "ci-1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/code-interpreters/aws.codeinterpreter.v1/tools/invoke"))
            .and(header(CODE_SESSION_HEADER, "ci-1"))
            .and(body_partial_json(json!({ "name": "executeCode" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"content": [{"type": "text", "text": "42\n"}], "isError": false}
            })))
            .mount(&server)
            .await;

        let vendor = vendor(&server);
        let session = vendor.start_sandbox("demo", SANDBOX_TIMEOUT).await.unwrap();
        assert_eq!(session.id, "ci-1");

        let output = vendor
            .invoke_tool(
                &session.id,
                "executeCode",
                json!({"language": "python", "code": "print(42)"}),
            )
            .await
            .unwrap();
        assert_eq!(output.text, "42");
    }

    #[tokio::test]
    async fn test_browser_start_reads_stream_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/browsers/aws.browser.v1/sessions/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sessionId": "br-1",
                "streams": {
                    "liveViewStream": {"streamEndpoint": "https://live"},
                    "automationStream": {"streamEndpoint": "wss://automation"}
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/browsers/aws.browser.v1/sessions/stop"))
            .and(header(BROWSER_SESSION_HEADER, "br-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let vendor = vendor(&server);
        let session = vendor.start_browser("demo", SANDBOX_TIMEOUT).await.unwrap();
        assert_eq!(session.live_view_endpoint.as_deref(), Some("https://live"));
        assert_eq!(session.automation_endpoint.as_deref(), Some("wss://automation"));

        vendor.stop_browser("br-1").await.unwrap();
    }
}
