//! Shared HTTP plumbing for the vendor client.

use agentcore_demo_core::VendorError;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::protocol::ErrorBody;
use crate::config::VendorConfig;

/// Which base URL a request targets.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Plane {
    Control,
    Data,
    Artifact,
}

/// HTTP client for the vendor platform.
///
/// Implements every vendor trait; one instance is shared by all handlers.
#[derive(Clone)]
pub struct HttpVendor {
    pub(crate) http: Client,
    control: Url,
    data: Url,
    artifact: Url,
    bearer_token: Option<String>,
    region: String,
}

impl HttpVendor {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns error if an endpoint is not a valid base URL or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &VendorConfig) -> Result<Self, VendorError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| VendorError::Network(e.to_string()))?;

        Ok(Self {
            http,
            control: parse_base(&config.control_endpoint)?,
            data: parse_base(&config.data_endpoint)?,
            artifact: parse_base(&config.artifact_endpoint)?,
            bearer_token: config.bearer_token.clone(),
            region: config.region.clone(),
        })
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Build a URL by appending percent-encoded path segments to a base.
    pub(crate) fn url(&self, plane: Plane, segments: &[&str]) -> Result<Url, VendorError> {
        let mut url = match plane {
            Plane::Control => self.control.clone(),
            Plane::Data => self.data.clone(),
            Plane::Artifact => self.artifact.clone(),
        };
        url.path_segments_mut()
            .map_err(|()| VendorError::Validation("endpoint cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with auth applied.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and fail on non-2xx statuses.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, VendorError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body);
        tracing::debug!(status = status.as_u16(), "vendor call failed: {err}");
        Err(err)
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, VendorError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| VendorError::Decode(e.to_string()))
    }

    /// Send and ignore the response body.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), VendorError> {
        self.send(builder).await.map(drop)
    }
}

fn parse_base(raw: &str) -> Result<Url, VendorError> {
    Url::parse(raw).map_err(|e| VendorError::Validation(format!("invalid endpoint {raw}: {e}")))
}

fn transport_error(e: reqwest::Error) -> VendorError {
    if e.is_timeout() {
        VendorError::Network(format!("request timed out: {e}"))
    } else if e.is_decode() {
        VendorError::Decode(e.to_string())
    } else {
        VendorError::Network(e.to_string())
    }
}

/// Map a non-2xx response to the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str) -> VendorError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("no details").to_string()
            } else {
                trimmed.to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VendorError::AccessDenied(message),
        StatusCode::TOO_MANY_REQUESTS => VendorError::Throttled(message),
        StatusCode::NOT_FOUND => VendorError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            VendorError::Validation(message)
        }
        other => VendorError::Service {
            status: other.as_u16(),
            message,
        },
    }
}
