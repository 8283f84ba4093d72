//! In-memory session storage.

use std::{
    collections::{HashMap, HashSet},
    sync::RwLock,
};

use agentcore_demo_core::{
    Session,
    session::SessionId,
    traits::{SessionFilter, SessionStore, StorageError},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// In-memory storage implementation.
///
/// Useful for development and single-process deployments.
/// Data is lost on restart.
pub struct MemoryStorage {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStorage {
    async fn bind(&self, session_id: &str, key: &str, value: Value) -> Result<(), StorageError> {
        self.sessions
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id))
            .bind(key, value);

        Ok(())
    }

    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self
            .sessions
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .get(session_id)
            .and_then(|s| s.get(key).cloned()))
    }

    async fn unbind(&self, session_id: &str, key: &str) -> Result<Option<Value>, StorageError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        Ok(sessions.get_mut(session_id).and_then(|s| s.unbind(key)))
    }

    async fn snapshot(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self
            .sessions
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .get(session_id)
            .cloned())
    }

    async fn clear(&self, session_id: &str) -> Result<bool, StorageError> {
        Ok(self
            .sessions
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .remove(session_id)
            .is_some())
    }

    async fn list(&self, filter: SessionFilter) -> Result<Vec<Session>, StorageError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let mut result: Vec<Session> = sessions
            .values()
            .filter(|s| {
                filter
                    .with_key
                    .as_deref()
                    .is_none_or(|key| s.bindings.contains_key(key))
            })
            .cloned()
            .collect();

        // Sort by updated_at descending
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        if let Some(limit) = filter.limit {
            result.truncate(limit);
        }

        Ok(result)
    }

    async fn remove_idle(
        &self,
        cutoff: DateTime<Utc>,
        keep: &HashSet<SessionId>,
    ) -> Result<Vec<SessionId>, StorageError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let idle: Vec<SessionId> = sessions
            .values()
            .filter(|s| s.updated_at < cutoff && !keep.contains(&s.session_id))
            .map(|s| s.session_id.clone())
            .collect();

        for id in &idle {
            sessions.remove(id);
        }

        Ok(idle)
    }
}

#[cfg(test)]
mod tests {
    use agentcore_demo_core::session::keys;

    use super::*;

    #[tokio::test]
    async fn test_unknown_session_reads_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.get("nobody", keys::RUNTIME_ARN).await.unwrap().is_none());
        assert!(storage.snapshot("nobody").await.unwrap().is_none());
        assert!(!storage.clear("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_bind_creates_session_last_write_wins() {
        let storage = MemoryStorage::new();
        storage
            .bind("tab-1", keys::STM_MEMORY_ID, Value::from("mem-a"))
            .await
            .unwrap();
        storage
            .bind("tab-1", keys::STM_MEMORY_ID, Value::from("mem-b"))
            .await
            .unwrap();

        let value = storage.get("tab-1", keys::STM_MEMORY_ID).await.unwrap();
        assert_eq!(value, Some(Value::from("mem-b")));
    }

    #[tokio::test]
    async fn test_list_filters_by_key() {
        let storage = MemoryStorage::new();
        storage.bind("a", keys::RUNTIME_ARN, Value::from("arn")).await.unwrap();
        storage.bind("b", keys::LTM_MEMORY_ID, Value::from("mem")).await.unwrap();

        let filter = SessionFilter {
            with_key: Some(keys::RUNTIME_ARN.to_string()),
            limit: None,
        };
        let listed = storage.list(filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id, "a");
    }

    #[tokio::test]
    async fn test_remove_idle_respects_keep() {
        let storage = MemoryStorage::new();
        storage.bind("old", keys::AGENT_NAME, Value::from("x")).await.unwrap();
        storage.bind("busy", keys::AGENT_NAME, Value::from("y")).await.unwrap();

        let keep = HashSet::from(["busy".to_string()]);
        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        let removed = storage.remove_idle(cutoff, &keep).await.unwrap();

        assert_eq!(removed, vec!["old".to_string()]);
        assert!(storage.snapshot("busy").await.unwrap().is_some());
    }
}
