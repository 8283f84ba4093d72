//! Session model: one client's correlation context.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Client-generated opaque session identifier.
pub type SessionId = String;

/// Longest accepted session identifier.
pub const MAX_SESSION_ID_LEN: usize = 256;

/// Well-known binding keys.
pub mod keys {
    pub const STM_MEMORY_ID: &str = "stm_memory_id";
    pub const LTM_MEMORY_ID: &str = "ltm_memory_id";
    pub const RUNTIME_ARN: &str = "runtime_arn";
    pub const RUNTIME_ID: &str = "runtime_id";
    pub const RUNTIME_VERSION: &str = "runtime_version";
    pub const AGENT_NAME: &str = "agent_name";
    pub const DEPLOYMENT_TYPE: &str = "deployment_type";
    pub const ARTIFACT_KEY: &str = "artifact_key";
    pub const CODE_SESSION_ID: &str = "code_session_id";
    pub const BROWSER_SESSION_ID: &str = "browser_session_id";

    /// Keys describing a deployed runtime; cleared together on cleanup.
    pub const RUNTIME_KEYS: [&str; 6] = [
        RUNTIME_ARN,
        RUNTIME_ID,
        RUNTIME_VERSION,
        AGENT_NAME,
        DEPLOYMENT_TYPE,
        ARTIFACT_KEY,
    ];
}

/// Streaming steps; at most one of each runs per session.
pub mod steps {
    pub const CREATE_STM: &str = "create_stm";
    pub const CREATE_LTM: &str = "create_ltm";
    pub const DEPLOY: &str = "deploy";
}

/// Invalid session identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("session_id must not be empty")]
    Empty,
    #[error("session_id exceeds {MAX_SESSION_ID_LEN} characters")]
    TooLong,
}

/// Check a client-supplied session identifier.
///
/// # Errors
/// Returns error if the id is blank or too long.
pub fn validate_session_id(id: &str) -> Result<(), SessionIdError> {
    if id.trim().is_empty() {
        return Err(SessionIdError::Empty);
    }
    if id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(SessionIdError::TooLong);
    }
    Ok(())
}

/// Resource bindings recorded for one session.
///
/// A binding is only written after the vendor call that produced it
/// reported success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub bindings: HashMap<String, Value>,
}

impl Session {
    /// Fresh session without bindings.
    #[must_use]
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            updated_at: now,
            bindings: HashMap::new(),
        }
    }

    /// Get a binding.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings.get(key)
    }

    /// Get a string binding.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).and_then(Value::as_str)
    }

    /// Set a binding, replacing any previous value.
    pub fn bind(&mut self, key: impl Into<String>, value: Value) {
        self.bindings.insert(key.into(), value);
        self.updated_at = Utc::now();
    }

    /// Remove a binding.
    pub fn unbind(&mut self, key: &str) -> Option<Value> {
        let removed = self.bindings.remove(key);
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }
}
