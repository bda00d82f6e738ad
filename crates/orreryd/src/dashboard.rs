//! Embedded dashboard page.
//!
//! The page is a static asset: every panel pulls already-normalized JSON
//! from the API, so the page script only fetches and renders.

use axum::response::Html;

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
