//! Headless entrypoint: no UI, no HTTP server. Metrics are pushed via
//! structured JSON logs to stdout.
//!
//! # Environment Variables
//! - `DATABASE_URL` - sqlite connection string (default: sqlite://agent-core.db)
//! - `OBSERVABILITY_ENABLED` - enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - seconds between metric snapshots (default: 60)

use agent_core::application::system::Application;
use agent_core::config::Config;
use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("agent-core {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    info!("building application...");
    let app = Application::build(config).await?;

    info!("starting scheduler and background tasks...");
    let handle = app.start().await?;
    info!("system running. Press Ctrl+C to shut down.");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining...");
    handle.stop().await?;
    info!("shutdown complete.");

    Ok(())
}
