//! Client-side mirror of the resources a session created.
//!
//! Lets a client pick up where it left off after a restart. The mirror is a
//! cache of what the server reported; the server-side registry stays the
//! source of truth and nothing is synced back.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use agentcore_demo_core::{
    RelayOutcome,
    session::{SessionId, keys, steps},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Mirror storage error.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available on this platform")]
    NoDataDir,
}

/// Flat record of a session's resource identifiers.
///
/// Unknown fields are ignored and missing ones default to empty, so records
/// written by older or newer clients still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorState {
    pub session_id: SessionId,
    pub stm_memory_id: Option<String>,
    pub ltm_memory_id: Option<String>,
    pub runtime_arn: Option<String>,
    pub runtime_id: Option<String>,
    pub runtime_version: Option<String>,
    pub agent_name: Option<String>,
    pub deployment_type: Option<String>,
    pub code_session_id: Option<String>,
    pub browser_session_id: Option<String>,
}

impl MirrorState {
    #[must_use]
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    /// Copy identifiers out of a streaming step's terminal result.
    ///
    /// Failed outcomes leave the state untouched. Returns whether anything
    /// changed.
    pub fn absorb(&mut self, step: &str, outcome: &RelayOutcome) -> bool {
        if !outcome.success {
            return false;
        }
        let field = |key: &str| outcome.get_str(key).map(str::to_string);

        match step {
            steps::CREATE_STM => replace(&mut self.stm_memory_id, field("memory_id")),
            steps::CREATE_LTM => replace(&mut self.ltm_memory_id, field("memory_id")),
            steps::DEPLOY => {
                let mut changed = false;
                changed |= replace(&mut self.runtime_arn, field(keys::RUNTIME_ARN));
                changed |= replace(&mut self.runtime_id, field(keys::RUNTIME_ID));
                changed |= replace(&mut self.runtime_version, field(keys::RUNTIME_VERSION));
                changed |= replace(&mut self.agent_name, field(keys::AGENT_NAME));
                changed |= replace(&mut self.deployment_type, field(keys::DEPLOYMENT_TYPE));
                changed
            }
            _ => false,
        }
    }

    /// Forget the deployed runtime after cleanup.
    pub fn clear_runtime(&mut self) {
        self.runtime_arn = None;
        self.runtime_id = None;
        self.runtime_version = None;
        self.agent_name = None;
        self.deployment_type = None;
    }
}

fn replace(slot: &mut Option<String>, value: Option<String>) -> bool {
    match value {
        Some(v) if slot.as_deref() != Some(v.as_str()) => {
            *slot = Some(v);
            true
        }
        _ => false,
    }
}

/// Durable key/value storage behind the mirror.
#[async_trait]
pub trait MirrorStorage: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, MirrorError>;

    async fn write(&self, key: &str, value: &str) -> Result<(), MirrorError>;

    async fn remove(&self, key: &str) -> Result<(), MirrorError>;
}

/// In-memory mirror storage, for tests and throwaway clients.
#[derive(Default)]
pub struct MemoryMirrorStorage {
    entries: RwLock<std::collections::HashMap<String, String>>,
}

impl MemoryMirrorStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MirrorStorage for MemoryMirrorStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, MirrorError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), MirrorError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MirrorError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory.
pub struct FileMirrorStorage {
    dir: PathBuf,
}

impl FileMirrorStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/agentcore-demo`.
    ///
    /// # Errors
    /// Returns error if the platform has no data directory.
    pub fn default_location() -> Result<Self, MirrorError> {
        let base = dirs::data_dir().ok_or(MirrorError::NoDataDir)?;
        Ok(Self::new(base.join("agentcore-demo")))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for `key`. Bytes other than ASCII alphanumerics and `-` are
    /// written as `_XX` hex, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                let _ = write!(name, "_{byte:02X}");
            }
        }
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl MirrorStorage for FileMirrorStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, MirrorError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), MirrorError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MirrorError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A session's mirror bound to its storage.
pub struct StateMirror<S: MirrorStorage> {
    storage: S,
    state: MirrorState,
}

impl<S: MirrorStorage> StateMirror<S> {
    fn key(session_id: &str) -> String {
        format!("session-{session_id}")
    }

    /// Restore the mirror for `session_id`.
    ///
    /// A missing, unreadable or malformed record yields an empty state.
    pub async fn load(storage: S, session_id: &str) -> Self {
        let state = match storage.read(&Self::key(session_id)).await {
            Ok(Some(raw)) => match serde_json::from_str::<MirrorState>(&raw) {
                Ok(state) if state.session_id == session_id => state,
                Ok(_) => {
                    tracing::warn!(session_id, "mirror record belongs to another session; ignoring");
                    MirrorState::new(session_id)
                }
                Err(e) => {
                    tracing::warn!(session_id, "malformed mirror record: {e}");
                    MirrorState::new(session_id)
                }
            },
            Ok(None) => MirrorState::new(session_id),
            Err(e) => {
                tracing::warn!(session_id, "failed to read mirror record: {e}");
                MirrorState::new(session_id)
            }
        };
        Self { storage, state }
    }

    #[must_use]
    pub const fn state(&self) -> &MirrorState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut MirrorState {
        &mut self.state
    }

    /// Record a streaming step's result and persist if anything changed.
    ///
    /// # Errors
    /// Returns error if persisting fails.
    pub async fn absorb(&mut self, step: &str, outcome: &RelayOutcome) -> Result<bool, MirrorError> {
        let changed = self.state.absorb(step, outcome);
        if changed {
            self.save().await?;
        }
        Ok(changed)
    }

    /// Persist the current state.
    ///
    /// # Errors
    /// Returns error if serialization or storage fails.
    pub async fn save(&self) -> Result<(), MirrorError> {
        let raw = serde_json::to_string_pretty(&self.state)?;
        self.storage
            .write(&Self::key(&self.state.session_id), &raw)
            .await
    }

    /// Remove every binding of the session, in memory and on storage.
    ///
    /// # Errors
    /// Returns error if storage fails.
    pub async fn clear(&mut self) -> Result<(), MirrorError> {
        self.state = MirrorState::new(std::mem::take(&mut self.state.session_id));
        self.storage.remove(&Self::key(&self.state.session_id)).await
    }
}
