//! HTTP client for the AgentCore platform.
//!
//! Provides:
//! - `VendorConfig` - Endpoints, auth and timeout
//! - `HttpVendor` - Implements the memory, runtime, artifact and sandbox traits

pub mod agentcore;
pub mod config;

pub use agentcore::{BROWSER_ID, CODE_INTERPRETER_ID, HttpVendor, SANDBOX_TIMEOUT};
pub use config::VendorConfig;
