//! Self-ping loop for free-tier hosts that idle out quiet processes.

use std::time::Duration;

use tracing::{info, warn};

const PING_INTERVAL: Duration = Duration::from_secs(600);
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawn the keep-alive loop when a public URL is configured. Pings once at
/// start, then every ten minutes. A failed ping is logged and the loop
/// continues.
pub fn spawn(url: Option<String>) {
    let Some(url) = url else {
        info!("Keep-alive: no external URL configured, loop not started");
        return;
    };

    tokio::spawn(async move {
        info!(url, "Keep-alive loop started");
        let client = reqwest::Client::builder()
            .timeout(PING_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        loop {
            match client.get(&url).send().await {
                Ok(resp) => info!(url, status = resp.status().as_u16(), "Keep-alive ping sent"),
                Err(e) => warn!(url, error = %e, "Keep-alive ping failed"),
            }
            tokio::time::sleep(PING_INTERVAL).await;
        }
    });
}
