//! Core abstractions for the AgentCore demo service.
//!
//! This crate provides the fundamental building blocks:
//! - `StreamEvent` - Typed relay output (log / code / result)
//! - `Relay` - Runs one vendor operation and streams its progress
//! - `MsgStore` - Broadcast + history for the live server log
//! - `Session` / `ResourceHandle` - Correlation and vendor resource model
//! - Storage and vendor traits

pub mod api;
pub mod event;
pub mod msg_store;
pub mod poll;
pub mod relay;
pub mod resource;
pub mod session;
pub mod traits;

pub use event::{RelayOutcome, StreamEvent};
pub use msg_store::{LogEntry, MsgStore, MsgStoreLayer};
pub use poll::{PollOutcome, PollPolicy, poll_bounded};
pub use relay::{Relay, RelaySender, RelayStream, RelaySuccess};
pub use resource::{ResourceHandle, ResourceKind, ResourceStatus};
pub use session::{Session, SessionId};
pub use traits::{
    ArtifactStore, BrowserApi, CodeInterpreterApi, MemoryApi, RuntimeApi, SessionStore,
    VendorError,
};
