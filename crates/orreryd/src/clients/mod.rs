//! Upstream feed clients.
//!
//! All clients share one reqwest client (timeout + user agent set once) and
//! answer with `ApiError::Upstream` on transport or HTTP-status failures so
//! handlers can degrade their panel independently.

pub mod astro;
pub mod iss;
pub mod jwst;

pub use astro::AstroClient;
pub use iss::IssClient;
pub use jwst::{FeedRequest, JwstClient, RawFeed};

use crate::errors::ApiError;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Build the shared HTTP client.
pub fn build_http(timeout_secs: u64) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("orreryd/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ApiError::from)
}

/// Retry with exponential backoff (1s, 2s, ...).
pub(crate) async fn fetch_with_retry<F, Fut, T>(
    f: F,
    max_retries: usize,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut delay = 1;
    for attempt in 1..=max_retries {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    info!("Request succeeded on retry attempt {}/{}", attempt, max_retries);
                }
                return Ok(result);
            }
            Err(e) if attempt < max_retries => {
                warn!(
                    "Request failed, retry attempt {}/{}: {}",
                    attempt, max_retries, e
                );
                tokio::time::sleep(Duration::from_secs(delay)).await;
                delay *= 2;
            }
            Err(e) => {
                error!("Request failed after {} attempts: {}", max_retries, e);
                return Err(e);
            }
        }
    }
    unreachable!()
}
