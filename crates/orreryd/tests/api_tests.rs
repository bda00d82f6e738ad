//! Router-level API tests.
//!
//! These are deterministic - no network, in-memory database. The feed
//! endpoints that depend on an upstream response are not driven here; the
//! normalization they apply is covered by the orrery_common unit tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use orreryd::config::Config;
use orreryd::server::{build_router, AppState};
use orreryd::storage::Storage;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_state() -> Arc<AppState> {
    let storage = Storage::open_in_memory().unwrap();
    storage.init_tables().await.unwrap();
    Arc::new(AppState::with_storage(Config::default(), storage).unwrap())
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, String) {
    let response = build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(state, uri).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_status_and_version() {
    let state = test_state().await;
    let (status, body) = get_json(state, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn root_redirects_to_dashboard() {
    let state = test_state().await;
    let response = build_router(state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/dashboard");
}

#[tokio::test]
async fn dashboard_page_is_served() {
    let state = test_state().await;
    let (status, body) = get(state, "/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Orrery"));
    assert!(body.contains("galleryTrack"));
    assert!(body.contains("eventsBody"));
}

#[tokio::test]
async fn telemetry_lists_newest_first() {
    let state = test_state().await;

    let (status, body) = get_json(state.clone(), "/api/telemetry").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));

    state
        .storage
        .insert_telemetry("2025-01-01T00:00:00Z", 3.2, 21.0, "a.csv")
        .await
        .unwrap();
    state
        .storage
        .insert_telemetry("2025-01-02T00:00:00Z", 3.4, 22.5, "b.csv")
        .await
        .unwrap();

    let (_, body) = get_json(state, "/api/telemetry").await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["source_file"], "b.csv");
    assert_eq!(items[1]["voltage"], json!(3.2));
}

#[tokio::test]
async fn trend_projects_stored_positions() {
    let state = test_state().await;
    for (lat, vel) in [(10.0, 27500.0), (11.0, 27600.0), (12.0, 27700.0)] {
        state
            .storage
            .insert_position(
                "test",
                &json!({"latitude": lat, "longitude": 0.0, "velocity": vel, "altitude": 420.0}),
            )
            .await
            .unwrap();
    }

    let (status, body) = get_json(state, "/api/iss/trend?limit=2").await;
    assert_eq!(status, StatusCode::OK);

    let points = body["points"].as_array().unwrap();
    // Last two samples, oldest first
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["lat"], json!(11.0));
    assert_eq!(points[1]["lat"], json!(12.0));
    assert_eq!(points[1]["velocity"], json!(27700.0));
}

#[tokio::test]
async fn iss_last_is_not_found_until_a_fetch_lands() {
    let state = test_state().await;

    let (status, body) = get_json(state.clone(), "/api/iss/last").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["trace_id"].is_string());

    state
        .storage
        .insert_position("test", &json!({"latitude": 1.5, "longitude": 2.5}))
        .await
        .unwrap();

    let (status, body) = get_json(state, "/api/iss/last").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["latitude"], json!(1.5));
    assert_eq!(body["source_url"], "test");
}

#[tokio::test]
async fn history_returns_parsed_payloads() {
    let state = test_state().await;
    for i in 0..12 {
        state
            .storage
            .insert_position("test", &json!({"latitude": i}))
            .await
            .unwrap();
    }

    let (status, body) = get_json(state, "/api/iss/history").await;
    assert_eq!(status, StatusCode::OK);

    let items = body["items"].as_array().unwrap();
    // History endpoint caps at 10 entries, newest first
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["payload"]["latitude"], json!(11));
    assert!(items[0]["payload"].is_object());
}

#[tokio::test]
async fn cms_block_and_page_lifecycle() {
    let state = test_state().await;

    let (status, body) = get_json(state.clone(), "/api/cms/welcome_message").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    state
        .storage
        .put_cms_block("welcome_message", "<p>Welcome aboard</p>", true)
        .await
        .unwrap();

    let (status, body) = get_json(state.clone(), "/api/cms/welcome_message").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "welcome_message");
    assert_eq!(body["content"], "<p>Welcome aboard</p>");

    // Same block also renders as a standalone page
    let (status, body) = get(state.clone(), "/page/welcome_message").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>Welcome aboard</p>");

    let (status, _) = get(state, "/page/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn panels_fail_independently() {
    let state = test_state().await;
    // CMS lookup failing (missing block) must not affect the other panels.
    let (cms_status, _) = get_json(state.clone(), "/api/cms/nope").await;
    assert_eq!(cms_status, StatusCode::NOT_FOUND);

    let (trend_status, trend) = get_json(state.clone(), "/api/iss/trend").await;
    assert_eq!(trend_status, StatusCode::OK);
    assert_eq!(trend["points"], json!([]));

    let (telemetry_status, _) = get_json(state, "/api/telemetry").await;
    assert_eq!(telemetry_status, StatusCode::OK);
}
