//! Session registry and storage for the AgentCore demo.
//!
//! Provides:
//! - `SessionRegistry` - Per-session resource bindings and step guards
//! - Storage implementations (memory)

pub mod registry;
pub mod storage;

pub use registry::{RegistryError, RegistryStatus, SessionRegistry, SessionSummary, StepGuard};
