//! Astronomical-events client.
//!
//! The events API authenticates with basic auth (application id / secret)
//! and answers arbitrary JSON - usually the structured table shape, but the
//! normalizer handles anything, so the payload is passed through untouched.

use crate::errors::ApiError;
use chrono::{Days, Utc};
use serde_json::Value;
use tracing::debug;

/// Longest supported event horizon, matching the filter form's cap.
const MAX_DAYS: u32 = 366;

pub struct AstroClient {
    http: reqwest::Client,
    events_url: String,
    app_id: String,
    app_secret: String,
}

impl AstroClient {
    pub fn new(http: reqwest::Client, events_url: &str, app_id: &str, app_secret: &str) -> Self {
        Self {
            http,
            events_url: events_url.to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
        }
    }

    /// Fetch events for an observer position over the next `days` days.
    pub async fn events(&self, lat: f64, lon: f64, days: u32) -> Result<Value, ApiError> {
        let days = days.clamp(1, MAX_DAYS);
        let now = Utc::now();
        let from = now.date_naive();
        let to = from
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(from);

        debug!("Fetching astro events: lat={} lon={} days={}", lat, lon, days);

        let mut request = self.http.get(&self.events_url).query(&[
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("elevation", "0".to_string()),
            ("from_date", from.format("%Y-%m-%d").to_string()),
            ("to_date", to.format("%Y-%m-%d").to_string()),
            ("time", now.format("%H:%M:%S").to_string()),
        ]);
        if !self.app_id.is_empty() {
            request = request.basic_auth(&self.app_id, Some(&self.app_secret));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!("HTTP {}", response.status())));
        }
        Ok(response.json::<Value>().await?)
    }
}
