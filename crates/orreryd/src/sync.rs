//! Background ISS position sync.
//!
//! One long-lived task fetches the current position every configured
//! interval and appends it to the fetch log. A slow fetch delays the next
//! tick; ticks are never cancelled or de-duplicated - the upstream GET is
//! idempotent and the interval is short.

use crate::server::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub fn spawn_iss_sync(state: Arc<AppState>) {
    tokio::spawn(async move {
        let interval = state.config.upstream.iss_sync_interval_secs;
        info!("ISS sync task started with interval {} seconds", interval);

        loop {
            match state.iss.fetch_position().await {
                Ok(payload) => {
                    match state.storage.insert_position(state.iss.url(), &payload).await {
                        Ok(id) => info!("Stored ISS position with id {}", id),
                        Err(e) => error!("Failed to store ISS position: {:?}", e),
                    }
                }
                Err(e) => error!("ISS sync failed: {}", e),
            }

            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    });
}
