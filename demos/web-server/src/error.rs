//! HTTP error responses.

use agentcore_demo_core::VendorError;
use agentcore_demo_session::RegistryError;
use agentcore_demo_transport::ServerMessage;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Vendor(#[from] VendorError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status and machine-readable code.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Vendor(e) => match e {
                VendorError::AccessDenied(_) => (StatusCode::FORBIDDEN, "access_denied"),
                VendorError::Throttled(_) => (StatusCode::TOO_MANY_REQUESTS, "throttled"),
                VendorError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                VendorError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
                VendorError::Network(_) => (StatusCode::BAD_GATEWAY, "network"),
                VendorError::Service { .. } | VendorError::Decode(_) => {
                    (StatusCode::BAD_GATEWAY, "vendor_error")
                }
            },
            Self::Registry(e) => match e {
                RegistryError::AlreadyRunning { .. } => (StatusCode::CONFLICT, "already_running"),
                RegistryError::InvalidSessionId(_) => (StatusCode::BAD_REQUEST, "validation"),
                RegistryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, "{self}");
        } else {
            tracing::warn!(code, "{self}");
        }
        (status, Json(ServerMessage::error(code, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = ApiError::from(VendorError::NotFound("mem-1".into()));
        assert_eq!(not_found.status_and_code(), (StatusCode::NOT_FOUND, "not_found"));

        let busy = ApiError::from(RegistryError::AlreadyRunning {
            session_id: "tab".into(),
            step: "deploy".into(),
        });
        assert_eq!(busy.status_and_code().0, StatusCode::CONFLICT);

        let throttled = ApiError::from(VendorError::Throttled("slow".into()));
        assert_eq!(throttled.status_and_code().0, StatusCode::TOO_MANY_REQUESTS);
    }
}
