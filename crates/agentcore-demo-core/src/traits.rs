//! Core traits for storage and the vendor boundary.

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::{
    api::{
        BrowserSession, ConversationTurn, CreateMemory, CreateRuntime, MemoryDescriptor,
        MemoryEvent, MemoryRecord, RuntimeDescriptor, SandboxSession, ToolOutput,
    },
    session::{Session, SessionId},
};

/// Session filter for queries.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Only sessions holding this binding key.
    pub with_key: Option<String>,
    /// Limit results.
    pub limit: Option<usize>,
}

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for session storage backends.
///
/// Unknown sessions are not an error: reads return `None`/empty and the
/// first `bind` creates the session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a binding, creating the session if needed. Last write wins.
    async fn bind(&self, session_id: &str, key: &str, value: Value) -> Result<(), StorageError>;

    /// Get a binding.
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, StorageError>;

    /// Remove one binding, returning the old value.
    async fn unbind(&self, session_id: &str, key: &str) -> Result<Option<Value>, StorageError>;

    /// Get the whole session.
    async fn snapshot(&self, session_id: &str) -> Result<Option<Session>, StorageError>;

    /// Drop a session and all its bindings. Returns whether it existed.
    async fn clear(&self, session_id: &str) -> Result<bool, StorageError>;

    /// List sessions, most recently updated first.
    async fn list(&self, filter: SessionFilter) -> Result<Vec<Session>, StorageError>;

    /// Drop sessions last updated before `cutoff`, except those in `keep`.
    async fn remove_idle(
        &self,
        cutoff: DateTime<Utc>,
        keep: &HashSet<SessionId>,
    ) -> Result<Vec<SessionId>, StorageError>;
}

/// Failure reported at the vendor boundary.
///
/// Relays do not branch on the variant; the HTTP layer uses it to pick a
/// status code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VendorError {
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Throttled: {0}")]
    Throttled(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl VendorError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Memory control and data plane.
#[async_trait]
pub trait MemoryApi: Send + Sync {
    async fn create_memory(&self, request: &CreateMemory) -> Result<MemoryDescriptor, VendorError>;

    async fn get_memory(&self, memory_id: &str) -> Result<MemoryDescriptor, VendorError>;

    async fn list_memories(&self, max_results: u32) -> Result<Vec<MemoryDescriptor>, VendorError>;

    async fn delete_memory(&self, memory_id: &str) -> Result<(), VendorError>;

    /// Store conversational turns as one event.
    async fn create_event(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<MemoryEvent, VendorError>;

    async fn list_events(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        max_results: u32,
    ) -> Result<Vec<MemoryEvent>, VendorError>;

    /// Semantic search over extracted records.
    async fn retrieve_records(
        &self,
        memory_id: &str,
        namespace: &str,
        query: &str,
        top_k: u32,
    ) -> Result<Vec<MemoryRecord>, VendorError>;

    async fn list_records(
        &self,
        memory_id: &str,
        namespace: &str,
        max_results: u32,
    ) -> Result<Vec<MemoryRecord>, VendorError>;
}

/// Agent runtime control and data plane.
#[async_trait]
pub trait RuntimeApi: Send + Sync {
    async fn create_runtime(&self, request: &CreateRuntime) -> Result<RuntimeDescriptor, VendorError>;

    async fn get_runtime(&self, runtime_id: &str, version: &str) -> Result<RuntimeDescriptor, VendorError>;

    /// Invoke the runtime with a JSON payload and return its JSON response.
    async fn invoke_runtime(
        &self,
        runtime_arn: &str,
        runtime_session_id: &str,
        payload: &Value,
    ) -> Result<Value, VendorError>;

    async fn delete_runtime(&self, runtime_id: &str) -> Result<(), VendorError>;
}

/// Object storage for deployment packages.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), VendorError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), VendorError>;
}

/// Code interpreter sandboxes.
#[async_trait]
pub trait CodeInterpreterApi: Send + Sync {
    async fn start_sandbox(&self, name: &str, timeout: Duration) -> Result<SandboxSession, VendorError>;

    /// Invoke a sandbox tool such as `executeCode` or `executeCommand`.
    async fn invoke_tool(
        &self,
        session_id: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolOutput, VendorError>;

    async fn stop_sandbox(&self, session_id: &str) -> Result<(), VendorError>;
}

/// Browser sandboxes.
#[async_trait]
pub trait BrowserApi: Send + Sync {
    async fn start_browser(&self, name: &str, timeout: Duration) -> Result<BrowserSession, VendorError>;

    async fn stop_browser(&self, session_id: &str) -> Result<(), VendorError>;
}
