//! AgentCore demo server.
//!
//! Run with: cargo run -p agentcore-demo-server -- --config agentcore-demo.toml

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use agentcore_demo_core::{MsgStore, MsgStoreLayer};
use agentcore_demo_server::{AppState, load_config, router};
use agentcore_demo_vendor::HttpVendor;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "agentcore-demo-server", about = "AgentCore demo HTTP service")]
struct Args {
    /// TOML config file; `agentcore-demo.toml` is used when present.
    #[arg(short, long, env = "AGENTCORE_DEMO_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logs = Arc::new(MsgStore::new());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(MsgStoreLayer::new(Arc::clone(&logs)))
        .init();

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    let addr: SocketAddr = match args.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("invalid server.bind {:?}", config.server.bind))?,
    };

    let vendor = HttpVendor::new(&config.aws.vendor_config()).context("failed to build vendor client")?;
    tracing::info!(region = vendor.region(), "vendor client ready");

    let (sweep_interval, session_idle) = (config.server.sweep_interval(), config.server.session_idle());
    let state = AppState::new(config, Arc::new(vendor), logs);
    let _sweeper = Arc::clone(&state.registry).spawn_sweeper(sweep_interval, session_idle);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{addr}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
