//! AgentCore REST client.

pub mod client;
mod memory;
pub mod protocol;
mod runtime;
mod sandbox;

pub use client::HttpVendor;
pub use runtime::RUNTIME_SESSION_HEADER;
pub use sandbox::{BROWSER_ID, CODE_INTERPRETER_ID, SANDBOX_TIMEOUT};
