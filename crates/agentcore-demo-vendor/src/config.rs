//! Vendor endpoint configuration.

use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how to reach the vendor platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorConfig {
    /// Region the endpoints live in.
    pub region: String,
    /// Base URL of the control plane (resource lifecycle).
    pub control_endpoint: String,
    /// Base URL of the data plane (events, invocations, sandboxes).
    pub data_endpoint: String,
    /// Base URL of the object store holding deployment packages.
    pub artifact_endpoint: String,
    /// Sent as `Authorization: Bearer ...` when set.
    pub bearer_token: Option<String>,
    pub request_timeout: Duration,
}

impl VendorConfig {
    /// Public endpoints for a region.
    #[must_use]
    pub fn for_region<S: Into<String>>(region: S) -> Self {
        let region = region.into();
        Self {
            control_endpoint: format!("https://bedrock-agentcore-control.{region}.amazonaws.com"),
            data_endpoint: format!("https://bedrock-agentcore.{region}.amazonaws.com"),
            artifact_endpoint: format!("https://s3.{region}.amazonaws.com"),
            region,
            bearer_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Route every plane to one base URL, e.g. a local signing proxy.
    #[must_use]
    pub fn single_endpoint<S: Into<String>>(mut self, base: S) -> Self {
        let base = base.into();
        self.control_endpoint.clone_from(&base);
        self.data_endpoint.clone_from(&base);
        self.artifact_endpoint = base;
        self
    }

    #[must_use]
    pub fn control_endpoint<S: Into<String>>(mut self, url: S) -> Self {
        self.control_endpoint = url.into();
        self
    }

    #[must_use]
    pub fn data_endpoint<S: Into<String>>(mut self, url: S) -> Self {
        self.data_endpoint = url.into();
        self
    }

    #[must_use]
    pub fn artifact_endpoint<S: Into<String>>(mut self, url: S) -> Self {
        self.artifact_endpoint = url.into();
        self
    }

    #[must_use]
    pub fn bearer_token<S: Into<String>>(mut self, token: Option<S>) -> Self {
        self.bearer_token = token.map(Into::into).filter(|t: &String| !t.is_empty());
        self
    }

    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self::for_region("us-east-1")
    }
}
