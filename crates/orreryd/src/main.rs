//! Orrery Daemon - space telemetry dashboard
//!
//! Serves the dashboard page and its JSON API, keeps the ISS position log
//! fresh in the background, and normalizes upstream feed payloads.

use anyhow::Result;
use orreryd::{server, sync, AppState, Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("orreryd=info".parse()?))
        .init();

    info!("orreryd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let state = AppState::new(config)?;

    state.storage.init_tables().await?;
    info!("Database tables initialized");

    let state = Arc::new(state);
    sync::spawn_iss_sync(state.clone());

    server::run(state).await
}
