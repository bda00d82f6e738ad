//! API routes for orreryd.
//!
//! One route group per dashboard panel. Each handler owns its own failure
//! mode - a feed erroring returns the error envelope for that panel only.

use crate::clients::FeedRequest;
use crate::dashboard;
use crate::errors::ApiError;
use crate::server::AppState;
use crate::storage::{PositionLog, TelemetryRow, TrendPoint};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
    Json, Router,
};
use orrery_common::{gallery, normalize_events, FeedResult, NormalizedEvent, DISPLAY_LIMIT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

type AppStateArc = Arc<AppState>;

/// Most trend points a single request may ask for.
const TREND_LIMIT_MAX: usize = 1000;

// ============================================================================
// Page Routes
// ============================================================================

pub fn page_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/dashboard", get(dashboard::dashboard_page))
        .route("/page/:slug", get(cms_page))
}

/// CMS-managed page, rendered as-is.
async fn cms_page(
    State(state): State<AppStateArc>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    match state.storage.cms_block(&slug).await? {
        Some(content) => Ok(Html(content)),
        None => Err(ApiError::NotFound(format!("page '{}' not found", slug))),
    }
}

// ============================================================================
// ISS Routes
// ============================================================================

pub fn iss_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/iss/trend", get(iss_trend))
        .route("/api/iss/last", get(iss_last))
        .route("/api/iss/history", get(iss_history))
}

#[derive(Debug, Deserialize)]
struct TrendQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TrendResponse {
    points: Vec<TrendPoint>,
}

/// Recent position samples for the map trail and charts.
async fn iss_trend(
    State(state): State<AppStateArc>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendResponse>, ApiError> {
    let limit = query.limit.unwrap_or(240).min(TREND_LIMIT_MAX);
    let points = state.storage.trend_points(limit).await?;
    Ok(Json(TrendResponse { points }))
}

/// Latest stored position log.
async fn iss_last(State(state): State<AppStateArc>) -> Result<Json<PositionLog>, ApiError> {
    state
        .storage
        .history(1)
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no ISS position data available".to_string()))
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    items: Vec<PositionLog>,
}

/// Last raw fetches, payloads included.
async fn iss_history(State(state): State<AppStateArc>) -> Result<Json<HistoryResponse>, ApiError> {
    let items = state.storage.history(10).await?;
    Ok(Json(HistoryResponse { items }))
}

// ============================================================================
// Feed Routes (JWST gallery, astronomical events)
// ============================================================================

pub fn feed_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/jwst/feed", get(jwst_feed))
        .route("/api/astro/events", get(astro_events))
}

#[derive(Debug, Deserialize)]
struct FeedParams {
    #[serde(default = "default_feed_source")]
    source: String,
    suffix: Option<String>,
    program: Option<String>,
    instrument: Option<String>,
    #[serde(rename = "perPage", default = "default_per_page")]
    per_page: u32,
}

fn default_feed_source() -> String {
    "jpg".to_string()
}

fn default_per_page() -> u32 {
    24
}

/// Fetch, project, and map one page of the image feed.
async fn jwst_feed(
    State(state): State<AppStateArc>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResult>, ApiError> {
    let request = FeedRequest {
        source: params.source,
        suffix: params.suffix,
        program: params.program,
        instrument: params.instrument,
        per_page: params.per_page.clamp(1, 100),
    };

    let raw = state.jwst.fetch_feed(&request).await?;
    info!("JWST feed {}: {} items", raw.source, raw.count);

    Ok(Json(gallery::map_feed(&raw.items, &raw.source, raw.count)))
}

#[derive(Debug, Deserialize)]
struct EventsParams {
    lat: Option<f64>,
    lon: Option<f64>,
    days: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EventsResponse {
    /// Normalized rows, capped for table rendering.
    events: Vec<NormalizedEvent>,
    /// Full count before the display cap.
    count: usize,
    /// Untouched upstream payload for the raw-JSON viewer.
    raw: Value,
}

/// Fetch and normalize astronomical events for an observer position.
async fn astro_events(
    State(state): State<AppStateArc>,
    Query(params): Query<EventsParams>,
) -> Result<Json<EventsResponse>, ApiError> {
    // Form defaults: Moscow, one year ahead
    let lat = params.lat.unwrap_or(55.7558);
    let lon = params.lon.unwrap_or(37.6176);
    let days = params.days.unwrap_or(365);

    let raw = state.astro.events(lat, lon, days).await?;

    let mut events = normalize_events(&raw);
    let count = events.len();
    events.truncate(DISPLAY_LIMIT);
    info!("Astro events: {} normalized, {} shown", count, events.len());

    Ok(Json(EventsResponse { events, count, raw }))
}

// ============================================================================
// Telemetry Routes
// ============================================================================

pub fn telemetry_routes() -> Router<AppStateArc> {
    Router::new().route("/api/telemetry", get(telemetry_list))
}

#[derive(Debug, Serialize)]
struct TelemetryResponse {
    items: Vec<TelemetryRow>,
}

/// Latest legacy telemetry readings.
async fn telemetry_list(
    State(state): State<AppStateArc>,
) -> Result<Json<TelemetryResponse>, ApiError> {
    let items = state.storage.telemetry_recent(20).await?;
    Ok(Json(TelemetryResponse { items }))
}

// ============================================================================
// CMS Routes
// ============================================================================

pub fn cms_routes() -> Router<AppStateArc> {
    Router::new().route("/api/cms/:slug", get(cms_block))
}

#[derive(Debug, Serialize)]
struct CmsBlockResponse {
    slug: String,
    content: String,
}

/// Content of one CMS block, for the dashboard's managed panels.
async fn cms_block(
    State(state): State<AppStateArc>,
    Path(slug): Path<String>,
) -> Result<Json<CmsBlockResponse>, ApiError> {
    match state.storage.cms_block(&slug).await? {
        Some(content) => Ok(Json(CmsBlockResponse { slug, content })),
        None => Err(ApiError::NotFound(format!("block '{}' not found", slug))),
    }
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/health", get(health_check))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
