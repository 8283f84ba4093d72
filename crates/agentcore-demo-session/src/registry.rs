//! Session registry: resource bindings plus in-flight step tracking.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
    time::Duration,
};

use agentcore_demo_core::{
    Session,
    session::{SessionId, SessionIdError, validate_session_id},
    traits::{SessionFilter, SessionStore, StorageError},
};
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

/// Session registry error.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid session id: {0}")]
    InvalidSessionId(#[from] SessionIdError),
    #[error("Step '{step}' already running for session {session_id}")]
    AlreadyRunning { session_id: SessionId, step: String },
}

type StepKey = (SessionId, String);

/// Marks one (session, step) as running until dropped.
#[must_use = "the step is released as soon as the guard is dropped"]
pub struct StepGuard {
    in_flight: Arc<DashMap<StepKey, DateTime<Utc>>>,
    key: StepKey,
}

impl StepGuard {
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.key.0
    }

    #[must_use]
    pub fn step(&self) -> &str {
        &self.key.1
    }
}

impl Drop for StepGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

/// One session as reported by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub bindings: Vec<String>,
    pub running_steps: Vec<String>,
}

/// Registry-wide status.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub total_sessions: usize,
    pub running_steps: usize,
    pub sessions: Vec<SessionSummary>,
}

/// Maps client session ids to the vendor resources they created.
///
/// Replaces a process-global dictionary: handlers receive the registry
/// through shared state, and every read or write is keyed by session id.
pub struct SessionRegistry<S>
where
    S: SessionStore,
{
    storage: S,
    in_flight: Arc<DashMap<StepKey, DateTime<Utc>>>,
}

impl<S> SessionRegistry<S>
where
    S: SessionStore,
{
    /// Create a new registry over the given storage.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Record a binding after the vendor call that produced it succeeded.
    ///
    /// # Errors
    /// Returns error if the session id is invalid or storage fails.
    pub async fn bind(
        &self,
        session_id: &str,
        key: &str,
        value: impl Into<Value> + Send,
    ) -> Result<(), RegistryError> {
        validate_session_id(session_id)?;
        self.storage.bind(session_id, key, value.into()).await?;
        tracing::debug!(session_id, key, "bound resource");
        Ok(())
    }

    /// Look up a binding. Unknown sessions read as empty.
    ///
    /// # Errors
    /// Returns error if the session id is invalid or storage fails.
    pub async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, RegistryError> {
        validate_session_id(session_id)?;
        Ok(self.storage.get(session_id, key).await?)
    }

    /// Look up a string binding.
    ///
    /// # Errors
    /// Returns error if the session id is invalid or storage fails.
    pub async fn get_str(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<String>, RegistryError> {
        Ok(self
            .get(session_id, key)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Remove a binding.
    ///
    /// # Errors
    /// Returns error if the session id is invalid or storage fails.
    pub async fn unbind(&self, session_id: &str, key: &str) -> Result<Option<Value>, RegistryError> {
        validate_session_id(session_id)?;
        Ok(self.storage.unbind(session_id, key).await?)
    }

    /// Full view of a session; an empty one when nothing was bound yet.
    ///
    /// # Errors
    /// Returns error if the session id is invalid or storage fails.
    pub async fn snapshot(&self, session_id: &str) -> Result<Session, RegistryError> {
        validate_session_id(session_id)?;
        Ok(self
            .storage
            .snapshot(session_id)
            .await?
            .unwrap_or_else(|| Session::new(session_id)))
    }

    /// Forget a session entirely. Vendor resources are left untouched.
    ///
    /// # Errors
    /// Returns error if the session id is invalid or storage fails.
    pub async fn clear(&self, session_id: &str) -> Result<bool, RegistryError> {
        validate_session_id(session_id)?;
        let removed = self.storage.clear(session_id).await?;
        if removed {
            tracing::info!(session_id, "cleared session");
        }
        Ok(removed)
    }

    /// Claim a (session, step) slot for a streaming operation.
    ///
    /// # Errors
    /// Returns `AlreadyRunning` while another guard for the same slot lives.
    pub fn begin_step(&self, session_id: &str, step: &str) -> Result<StepGuard, RegistryError> {
        validate_session_id(session_id)?;
        let key = (session_id.to_string(), step.to_string());

        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRunning {
                session_id: key.0,
                step: key.1,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Ok(StepGuard {
                    in_flight: Arc::clone(&self.in_flight),
                    key,
                })
            }
        }
    }

    /// Whether a step is currently running for the session.
    #[must_use]
    pub fn is_running(&self, session_id: &str, step: &str) -> bool {
        self.in_flight
            .contains_key(&(session_id.to_string(), step.to_string()))
    }

    /// Drop sessions idle for longer than `max_idle`.
    ///
    /// Sessions with a running step are kept.
    ///
    /// # Errors
    /// Returns error if storage fails.
    pub async fn sweep_idle(&self, max_idle: Duration) -> Result<Vec<SessionId>, RegistryError> {
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(max_idle)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let busy: HashSet<SessionId> = self
            .in_flight
            .iter()
            .map(|entry| entry.key().0.clone())
            .collect();

        let removed = self.storage.remove_idle(cutoff, &busy).await?;
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "swept idle sessions");
        }
        Ok(removed)
    }

    /// Snapshot of the sessions matching `filter`, most recently updated
    /// first. `running_steps` counts every step in flight.
    ///
    /// # Errors
    /// Returns error if storage fails.
    pub async fn status(&self, filter: SessionFilter) -> Result<RegistryStatus, RegistryError> {
        let sessions = self.storage.list(filter).await?;

        let mut running: BTreeMap<SessionId, Vec<String>> = BTreeMap::new();
        for entry in self.in_flight.iter() {
            let (session_id, step) = entry.key();
            running
                .entry(session_id.clone())
                .or_default()
                .push(step.clone());
        }
        let running_steps = running.values().map(Vec::len).sum();

        let sessions: Vec<SessionSummary> = sessions
            .into_iter()
            .map(|s| {
                let mut bindings: Vec<String> = s.bindings.keys().cloned().collect();
                bindings.sort();
                let mut steps = running.remove(&s.session_id).unwrap_or_default();
                steps.sort();
                SessionSummary {
                    session_id: s.session_id,
                    created_at: s.created_at,
                    updated_at: s.updated_at,
                    bindings,
                    running_steps: steps,
                }
            })
            .collect();

        Ok(RegistryStatus {
            total_sessions: sessions.len(),
            running_steps,
            sessions,
        })
    }
}

impl<S> SessionRegistry<S>
where
    S: SessionStore + 'static,
{
    /// Periodically sweep idle sessions in the background.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration, max_idle: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_idle(max_idle).await {
                    tracing::warn!("idle sweep failed: {e}");
                }
            }
        })
    }
}
