//! JWST archive feed client.
//!
//! Queries the archive by source kind (all JPGs, by suffix, or by program)
//! and projects each archive entry into the `{url, link?, caption?}` item
//! shape the gallery mapper consumes. The projection is as permissive as the
//! mapper itself: entries missing fields still come through.

use crate::errors::ApiError;
use orrery_common::fields;
use serde_json::{json, Value};
use tracing::debug;

/// Gallery feed lookup parameters, straight from the filter form.
#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub source: String,
    pub suffix: Option<String>,
    pub program: Option<String>,
    pub instrument: Option<String>,
    pub per_page: u32,
}

/// Upstream response reduced to the feed shape, before gallery mapping.
#[derive(Debug, Clone)]
pub struct RawFeed {
    pub items: Vec<Value>,
    pub source: String,
    pub count: u64,
}

pub struct JwstClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl JwstClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch and project one page of the image feed.
    pub async fn fetch_feed(&self, req: &FeedRequest) -> Result<RawFeed, ApiError> {
        let (path, source) = self.resolve_source(req);
        debug!("Fetching JWST feed: {} ({})", path, source);

        let mut request = self
            .http
            .get(&path)
            .query(&[("page", "1"), ("perPage", &req.per_page.to_string())]);
        if !self.api_key.is_empty() {
            request = request.header("X-API-KEY", &self.api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!("HTTP {}", response.status())));
        }
        let payload = response.json::<Value>().await?;

        let entries: Vec<&Value> = payload
            .get("body")
            .and_then(Value::as_array)
            .map(|body| {
                body.iter()
                    .filter(|entry| matches_instrument(entry, req.instrument.as_deref()))
                    .collect()
            })
            .unwrap_or_default();

        let items: Vec<Value> = entries.into_iter().map(project_entry).collect();
        let count = items.len() as u64;

        Ok(RawFeed {
            items,
            source,
            count,
        })
    }

    /// Pick the archive path and the source label for a request. Unknown or
    /// underspecified kinds fall back to the all-JPGs listing.
    fn resolve_source(&self, req: &FeedRequest) -> (String, String) {
        let suffix = req.suffix.as_deref().unwrap_or("").trim();
        let program = req.program.as_deref().unwrap_or("").trim();

        match req.source.as_str() {
            "suffix" if !suffix.is_empty() => (
                format!("{}/all/suffix/{}", self.base_url, suffix),
                format!("suffix:{}", suffix),
            ),
            "program" if !program.is_empty() => (
                format!("{}/program/id/{}", self.base_url, program),
                format!("program:{}", program),
            ),
            _ => (
                format!("{}/all/type/jpg", self.base_url),
                "jpg".to_string(),
            ),
        }
    }
}

/// Keep entries whose instrument list mentions the requested instrument.
/// No filter, or an entry without an instrument list, passes everything.
fn matches_instrument(entry: &Value, instrument: Option<&str>) -> bool {
    let Some(wanted) = instrument.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let Some(instruments) = fields::lookup(entry, "details.instruments").and_then(Value::as_array)
    else {
        return true;
    };
    instruments.iter().any(|i| {
        i.get("instrument")
            .and_then(Value::as_str)
            .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
    })
}

/// Project an archive entry into a feed item for the gallery mapper.
fn project_entry(entry: &Value) -> Value {
    let url = fields::first_of_or_empty(entry, &["location", "thumbnail"]);
    let caption = fields::first_of_or_empty(entry, &["details.description", "observation_id"]);
    json!({ "url": url, "caption": caption })
}
