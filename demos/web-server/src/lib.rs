//! AgentCore demo HTTP service.
//!
//! Each demo step is an endpoint. Long-running steps stream `log`, `code`
//! and a final `result` event over SSE; the rest answer with JSON.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;

pub use self::{
    config::{AppConfig, load_config},
    error::ApiError,
    routes::router,
    state::AppState,
};
