//! Request and response models exchanged with the vendor platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{ResourceHandle, ResourceKind, ResourceStatus};

/// Namespace template used by the demo's extraction strategies.
pub const ACTOR_NAMESPACE_TEMPLATE: &str = "/strategies/{memoryStrategyId}/actors/{actorId}";

/// Memory extraction strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Semantic,
    UserPreference,
    Summary,
}

/// Extraction strategy requested at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub kind: StrategyKind,
    pub name: String,
    pub description: String,
    pub namespaces: Vec<String>,
}

impl StrategySpec {
    /// Semantic facts scoped per actor.
    #[must_use]
    pub fn semantic_facts() -> Self {
        Self {
            kind: StrategyKind::Semantic,
            name: "semantic_facts".into(),
            description: "Extract important facts and information the user mentions".into(),
            namespaces: vec![ACTOR_NAMESPACE_TEMPLATE.into()],
        }
    }

    /// User preferences scoped per actor.
    #[must_use]
    pub fn user_preferences() -> Self {
        Self {
            kind: StrategyKind::UserPreference,
            name: "user_preferences".into(),
            description: "Extract the user's preferences, likes and habits".into(),
            namespaces: vec![ACTOR_NAMESPACE_TEMPLATE.into()],
        }
    }
}

/// Parameters for creating a memory resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMemory {
    pub name: String,
    pub description: String,
    pub event_expiry_days: u32,
    /// Empty for short-term memory.
    pub strategies: Vec<StrategySpec>,
}

/// Strategy as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    pub strategy_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Memory resource as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDescriptor {
    pub id: String,
    pub arn: Option<String>,
    pub name: Option<String>,
    pub status: ResourceStatus,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub strategies: Vec<StrategyDescriptor>,
}

impl MemoryDescriptor {
    #[must_use]
    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle {
            kind: ResourceKind::Memory,
            id: self.id.clone(),
            arn: self.arn.clone(),
            status: self.status.clone(),
            created_at: self.created_at,
        }
    }
}

/// Speaker of a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Assistant,
    Tool,
    Other,
}

/// One message stored in short-term memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Raw event stored in a memory resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub event_id: String,
    pub session_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub turns: Vec<ConversationTurn>,
}

/// Record extracted asynchronously by a long-term memory strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub record_id: String,
    pub text: String,
    #[serde(default)]
    pub namespaces: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub score: Option<f64>,
}

/// Where the runtime's code comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "deployment_type", rename_all = "snake_case")]
pub enum RuntimeArtifact {
    /// Zip package previously uploaded to object storage.
    Code {
        bucket: String,
        prefix: String,
        runtime: String,
        entry_point: Vec<String>,
    },
    /// Prebuilt container image.
    Container { image_uri: String },
}

impl RuntimeArtifact {
    #[must_use]
    pub const fn deployment_type(&self) -> &'static str {
        match self {
            Self::Code { .. } => "code",
            Self::Container { .. } => "container",
        }
    }
}

/// Parameters for creating an agent runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRuntime {
    pub name: String,
    pub artifact: RuntimeArtifact,
    pub role_arn: String,
    pub network_mode: String,
}

/// Agent runtime as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDescriptor {
    pub id: String,
    pub arn: String,
    pub version: String,
    pub status: ResourceStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RuntimeDescriptor {
    #[must_use]
    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle {
            kind: ResourceKind::Runtime,
            id: self.id.clone(),
            arn: Some(self.arn.clone()),
            status: self.status.clone(),
            created_at: self.created_at,
        }
    }
}

/// Text collected from a sandbox tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

/// Started code-interpreter sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxSession {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Started browser sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserSession {
    pub id: String,
    pub live_view_endpoint: Option<String>,
    pub automation_endpoint: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
