//! Shared handler state.

use std::sync::Arc;

use agentcore_demo_core::{
    ArtifactStore, BrowserApi, CodeInterpreterApi, MemoryApi, MsgStore, RuntimeApi,
    session::SessionId,
};
use agentcore_demo_session::{SessionRegistry, storage::MemoryStorage};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::config::AppConfig;

/// Code interpreter sandbox started on behalf of a session.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedSandbox {
    pub sandbox_id: String,
    pub session_id: SessionId,
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub invocations: u32,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<SessionRegistry<MemoryStorage>>,
    pub logs: Arc<MsgStore>,
    pub memory: Arc<dyn MemoryApi>,
    pub runtime: Arc<dyn RuntimeApi>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub code: Arc<dyn CodeInterpreterApi>,
    pub browser: Arc<dyn BrowserApi>,
    /// Code interpreter sandboxes by sandbox id.
    pub sandboxes: Arc<DashMap<String, TrackedSandbox>>,
}

impl AppState {
    /// Wire every vendor seam to one implementation.
    pub fn new<V>(config: AppConfig, vendor: Arc<V>, logs: Arc<MsgStore>) -> Self
    where
        V: MemoryApi + RuntimeApi + ArtifactStore + CodeInterpreterApi + BrowserApi + 'static,
    {
        let memory: Arc<dyn MemoryApi> = vendor.clone();
        let runtime: Arc<dyn RuntimeApi> = vendor.clone();
        let artifacts: Arc<dyn ArtifactStore> = vendor.clone();
        let code: Arc<dyn CodeInterpreterApi> = vendor.clone();
        let browser: Arc<dyn BrowserApi> = vendor;

        Self {
            config: Arc::new(config),
            registry: Arc::new(SessionRegistry::new(MemoryStorage::new())),
            logs,
            memory,
            runtime,
            artifacts,
            code,
            browser,
            sandboxes: Arc::new(DashMap::new()),
        }
    }
}
