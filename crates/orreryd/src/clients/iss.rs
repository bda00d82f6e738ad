//! ISS position client.

use crate::clients::fetch_with_retry;
use crate::errors::ApiError;
use serde_json::Value;
use tracing::info;

const MAX_RETRIES: usize = 3;

pub struct IssClient {
    http: reqwest::Client,
    url: String,
}

impl IssClient {
    pub fn new(http: reqwest::Client, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current ISS position payload, retrying transient failures.
    pub async fn fetch_position(&self) -> Result<Value, ApiError> {
        info!("Fetching ISS position from {}", self.url);

        fetch_with_retry(
            || async {
                let response = self.http.get(&self.url).send().await?;
                if !response.status().is_success() {
                    return Err(ApiError::Upstream(format!("HTTP {}", response.status())));
                }
                Ok(response.json::<Value>().await?)
            },
            MAX_RETRIES,
        )
        .await
    }
}
