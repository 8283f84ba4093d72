//! In-process vendor double for router tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use agentcore_demo_core::{
    ArtifactStore, BrowserApi, CodeInterpreterApi, MemoryApi, ResourceStatus, RuntimeApi,
    VendorError,
    api::{
        BrowserSession, ConversationTurn, CreateMemory, CreateRuntime, MemoryDescriptor,
        MemoryEvent, MemoryRecord, RuntimeDescriptor, SandboxSession, StrategyDescriptor,
        ToolOutput,
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};

/// How created memories and runtimes behave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// `CREATING`, then `ACTIVE` on the first status check.
    #[default]
    ActivatesOnCheck,
    /// Never leaves `CREATING`.
    StuckCreating,
    /// `CREATE_FAILED` on the first status check.
    FailsOnCheck,
    /// The create call itself is rejected.
    RejectsCreate,
}

#[derive(Default)]
struct Inner {
    lifecycle: Lifecycle,
    next_id: u32,
    memories: HashMap<String, MemoryDescriptor>,
    events: Vec<(String, String, String, Vec<ConversationTurn>)>,
    records: Vec<MemoryRecord>,
    runtimes: HashMap<String, RuntimeDescriptor>,
    invocations: Vec<Value>,
    objects: HashSet<String>,
    sandboxes: HashSet<String>,
    tool_calls: Vec<(String, String, Value)>,
    browsers: HashSet<String>,
}

impl Inner {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn check_create(&self, name: &str) -> Result<(), VendorError> {
        match self.lifecycle {
            Lifecycle::RejectsCreate => Err(VendorError::Validation(format!(
                "quota exceeded creating {name}"
            ))),
            _ => Ok(()),
        }
    }

    /// Status after a check of a resource currently in `current`.
    fn observe(&self, current: &ResourceStatus) -> ResourceStatus {
        if *current != ResourceStatus::Creating {
            return current.clone();
        }
        match self.lifecycle {
            Lifecycle::StuckCreating => ResourceStatus::Creating,
            Lifecycle::FailsOnCheck => ResourceStatus::CreateFailed,
            Lifecycle::ActivatesOnCheck | Lifecycle::RejectsCreate => ResourceStatus::Active,
        }
    }
}

/// Remembers everything it is asked to do. New resources follow the
/// configured [`Lifecycle`].
#[derive(Default)]
pub struct FakeVendor {
    inner: Mutex<Inner>,
}

impl FakeVendor {
    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner)
    }

    pub fn set_lifecycle(&self, lifecycle: Lifecycle) {
        self.with(|i| i.lifecycle = lifecycle);
    }

    pub fn add_record(&self, text: &str) {
        self.with(|i| {
            let record_id = i.id("rec");
            i.records.push(MemoryRecord {
                record_id,
                text: text.into(),
                namespaces: vec![],
                created_at: None,
                score: Some(0.8),
            });
        });
    }

    pub fn invocations(&self) -> Vec<Value> {
        self.with(|i| i.invocations.clone())
    }

    pub fn objects(&self) -> HashSet<String> {
        self.with(|i| i.objects.clone())
    }

    pub fn live_sandboxes(&self) -> usize {
        self.with(|i| i.sandboxes.len())
    }

    pub fn tool_calls(&self) -> Vec<(String, String, Value)> {
        self.with(|i| i.tool_calls.clone())
    }

    pub fn event_count(&self) -> usize {
        self.with(|i| i.events.len())
    }
}

#[async_trait]
impl MemoryApi for FakeVendor {
    async fn create_memory(&self, request: &CreateMemory) -> Result<MemoryDescriptor, VendorError> {
        self.with(|i| {
            i.check_create(&request.name)?;
            let id = i.id("mem");
            let strategies = request
                .strategies
                .iter()
                .map(|s| StrategyDescriptor {
                    strategy_id: format!("{}-{id}", s.name),
                    name: s.name.clone(),
                    kind: format!("{:?}", s.kind).to_uppercase(),
                })
                .collect();
            let memory = MemoryDescriptor {
                id: id.clone(),
                arn: Some(format!("arn:fake:memory/{id}")),
                name: Some(request.name.clone()),
                status: ResourceStatus::Creating,
                created_at: Some(chrono::Utc::now()),
                strategies,
            };
            i.memories.insert(id, memory.clone());
            Ok(memory)
        })
    }

    async fn get_memory(&self, memory_id: &str) -> Result<MemoryDescriptor, VendorError> {
        self.with(|i| {
            let current = i
                .memories
                .get(memory_id)
                .ok_or_else(|| VendorError::NotFound(memory_id.into()))?
                .status
                .clone();
            let status = i.observe(&current);
            let memory = i
                .memories
                .get_mut(memory_id)
                .ok_or_else(|| VendorError::NotFound(memory_id.into()))?;
            memory.status = status;
            Ok(memory.clone())
        })
    }

    async fn list_memories(&self, max_results: u32) -> Result<Vec<MemoryDescriptor>, VendorError> {
        Ok(self.with(|i| {
            i.memories
                .values()
                .take(max_results as usize)
                .cloned()
                .collect()
        }))
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<(), VendorError> {
        self.with(|i| {
            i.memories
                .remove(memory_id)
                .map(drop)
                .ok_or_else(|| VendorError::NotFound(format!("Memory {memory_id} not found")))
        })
    }

    async fn create_event(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<MemoryEvent, VendorError> {
        self.with(|i| {
            if !i.memories.contains_key(memory_id) {
                return Err(VendorError::NotFound(memory_id.into()));
            }
            i.events.push((
                memory_id.into(),
                actor_id.into(),
                session_id.into(),
                turns.to_vec(),
            ));
            Ok(MemoryEvent {
                event_id: i.id("ev"),
                session_id: Some(session_id.into()),
                timestamp: Some(chrono::Utc::now()),
                turns: turns.to_vec(),
            })
        })
    }

    async fn list_events(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        max_results: u32,
    ) -> Result<Vec<MemoryEvent>, VendorError> {
        Ok(self.with(|i| {
            i.events
                .iter()
                .enumerate()
                .filter(|(_, (m, a, s, _))| m == memory_id && a == actor_id && s == session_id)
                .take(max_results as usize)
                .map(|(n, (_, _, s, turns))| MemoryEvent {
                    event_id: format!("ev-{n}"),
                    session_id: Some(s.clone()),
                    timestamp: None,
                    turns: turns.clone(),
                })
                .collect()
        }))
    }

    async fn retrieve_records(
        &self,
        _memory_id: &str,
        namespace: &str,
        _query: &str,
        top_k: u32,
    ) -> Result<Vec<MemoryRecord>, VendorError> {
        Ok(self.with(|i| {
            i.records
                .iter()
                .take(top_k as usize)
                .cloned()
                .map(|mut r| {
                    r.namespaces = vec![namespace.to_string()];
                    r
                })
                .collect()
        }))
    }

    async fn list_records(
        &self,
        memory_id: &str,
        namespace: &str,
        max_results: u32,
    ) -> Result<Vec<MemoryRecord>, VendorError> {
        self.retrieve_records(memory_id, namespace, "", max_results)
            .await
    }
}

#[async_trait]
impl RuntimeApi for FakeVendor {
    async fn create_runtime(&self, request: &CreateRuntime) -> Result<RuntimeDescriptor, VendorError> {
        self.with(|i| {
            i.check_create(&request.name)?;
            let id = format!("{}-{}", request.name, i.id("rt"));
            let runtime = RuntimeDescriptor {
                arn: format!("arn:fake:runtime/{id}"),
                id: id.clone(),
                version: "1".into(),
                status: ResourceStatus::Creating,
                created_at: Some(chrono::Utc::now()),
                updated_at: None,
            };
            i.runtimes.insert(id, runtime.clone());
            Ok(runtime)
        })
    }

    async fn get_runtime(&self, runtime_id: &str, _version: &str) -> Result<RuntimeDescriptor, VendorError> {
        self.with(|i| {
            let current = i
                .runtimes
                .get(runtime_id)
                .ok_or_else(|| VendorError::NotFound(runtime_id.into()))?
                .status
                .clone();
            let status = i.observe(&current);
            let runtime = i
                .runtimes
                .get_mut(runtime_id)
                .ok_or_else(|| VendorError::NotFound(runtime_id.into()))?;
            runtime.status = status;
            Ok(runtime.clone())
        })
    }

    async fn invoke_runtime(
        &self,
        _runtime_arn: &str,
        _runtime_session_id: &str,
        payload: &Value,
    ) -> Result<Value, VendorError> {
        self.with(|i| i.invocations.push(payload.clone()));
        Ok(json!({ "result": "echo" }))
    }

    async fn delete_runtime(&self, runtime_id: &str) -> Result<(), VendorError> {
        self.with(|i| {
            i.runtimes
                .remove(runtime_id)
                .map(drop)
                .ok_or_else(|| VendorError::NotFound(format!("Runtime {runtime_id} not found")))
        })
    }
}

#[async_trait]
impl ArtifactStore for FakeVendor {
    async fn put_object(&self, bucket: &str, key: &str, _body: Bytes) -> Result<(), VendorError> {
        self.with(|i| i.objects.insert(format!("{bucket}/{key}")));
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), VendorError> {
        self.with(|i| i.objects.remove(&format!("{bucket}/{key}")));
        Ok(())
    }
}

#[async_trait]
impl CodeInterpreterApi for FakeVendor {
    async fn start_sandbox(&self, _name: &str, _timeout: Duration) -> Result<SandboxSession, VendorError> {
        Ok(self.with(|i| {
            let id = i.id("ci");
            i.sandboxes.insert(id.clone());
            SandboxSession {
                id,
                created_at: None,
            }
        }))
    }

    async fn invoke_tool(
        &self,
        session_id: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolOutput, VendorError> {
        self.with(|i| {
            if !i.sandboxes.contains(session_id) {
                return Err(VendorError::NotFound(session_id.into()));
            }
            i.tool_calls
                .push((session_id.into(), tool.into(), arguments));
            Ok(ToolOutput {
                text: format!("{tool} ok"),
                is_error: false,
            })
        })
    }

    async fn stop_sandbox(&self, session_id: &str) -> Result<(), VendorError> {
        self.with(|i| {
            i.sandboxes
                .remove(session_id)
                .then_some(())
                .ok_or_else(|| VendorError::NotFound(session_id.into()))
        })
    }
}

#[async_trait]
impl BrowserApi for FakeVendor {
    async fn start_browser(&self, _name: &str, _timeout: Duration) -> Result<BrowserSession, VendorError> {
        Ok(self.with(|i| {
            let id = i.id("br");
            i.browsers.insert(id.clone());
            BrowserSession {
                live_view_endpoint: Some(format!("https://live.fake/{id}")),
                automation_endpoint: None,
                id,
                created_at: None,
            }
        }))
    }

    async fn stop_browser(&self, session_id: &str) -> Result<(), VendorError> {
        self.with(|i| {
            i.browsers
                .remove(session_id)
                .then_some(())
                .ok_or_else(|| VendorError::NotFound(session_id.into()))
        })
    }
}
