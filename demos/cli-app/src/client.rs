//! HTTP client for the demo server.

use agentcore_demo_core::{RelayOutcome, StreamEvent};
use agentcore_demo_transport::{FrameDecoder, ServerMessage, protocol::FrameError};
use futures::StreamExt;
use reqwest::{Response, header::ACCEPT};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bad stream: {0}")]
    Frame(#[from] FrameError),
    #[error("server replied {status} ({code}): {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },
    #[error("stream ended without a result")]
    Truncated,
}

/// Thin wrapper around the server's JSON and SSE endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Map non-2xx replies to [`ClientError::Server`].
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ServerMessage>(&text) {
            Ok(reply) => (
                reply.code.unwrap_or_else(|| "error".into()),
                reply.message.unwrap_or_default(),
            ),
            Err(_) => ("error".into(), text),
        };
        Err(ClientError::Server {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Follow a streaming step, handing each event to `on_event`.
    ///
    /// # Errors
    /// Returns error on transport failure, a rejected request or a stream
    /// that closes before its `result` event.
    pub async fn stream_step<F>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        mut on_event: F,
    ) -> Result<RelayOutcome, ClientError>
    where
        F: FnMut(&StreamEvent),
    {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut decoder = FrameDecoder::new();
        let mut outcome = None;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            for event in decoder.push(&chunk?)? {
                on_event(&event);
                if let StreamEvent::Result(result) = event {
                    outcome = Some(result);
                }
            }
        }
        if let Some(event) = decoder.finish()? {
            on_event(&event);
            if let StreamEvent::Result(result) = event {
                outcome = Some(result);
            }
        }
        outcome.ok_or(ClientError::Truncated)
    }

    /// # Errors
    /// Returns error on transport failure or a non-2xx reply.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// # Errors
    /// Returns error on transport failure or a non-2xx reply.
    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        let response = self.http.delete(self.url(path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
