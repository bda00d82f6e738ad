//! HTTP server for orreryd.

use crate::clients::{self, AstroClient, IssClient, JwstClient};
use crate::config::Config;
use crate::routes;
use crate::storage::Storage;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub iss: IssClient,
    pub jwst: JwstClient,
    pub astro: AstroClient,
    pub start_time: Instant,
}

impl AppState {
    /// Open storage and build the upstream clients from config.
    pub fn new(config: Config) -> Result<Self> {
        let storage = Storage::open(&config.storage.db_path)?;
        Self::with_storage(config, storage)
    }

    /// Same as [`AppState::new`] but with caller-provided storage (tests use
    /// an in-memory database).
    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let http = clients::build_http(config.upstream.request_timeout_secs)?;
        let iss = IssClient::new(http.clone(), &config.upstream.iss_url);
        let jwst = JwstClient::new(
            http.clone(),
            &config.upstream.jwst_url,
            &config.upstream.jwst_api_key,
        );
        let astro = AstroClient::new(
            http,
            &config.upstream.astro_events_url,
            &config.upstream.astro_app_id,
            &config.upstream.astro_app_secret,
        );

        Ok(Self {
            config,
            storage,
            iss,
            jwst,
            astro,
            start_time: Instant::now(),
        })
    }
}

/// Assemble the full router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::iss_routes())
        .merge(routes::feed_routes())
        .merge(routes::telemetry_routes())
        .merge(routes::cms_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until shutdown.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.bind_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
