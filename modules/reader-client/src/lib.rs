pub mod error;

pub use error::{ReaderError, Result};

use std::time::Duration;

use tracing::debug;

/// Client for a reader/rendering service that executes client-side rendering
/// and returns readable text. The target URL is appended to the base endpoint
/// (Jina Reader convention: `GET <base>/<url>`).
pub struct ReaderClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReaderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch rendered, readable text for a URL.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/{}", self.base_url, url);

        debug!(url, "Reader fetch");

        let resp = self
            .client
            .get(&endpoint)
            .header("Accept", "text/plain")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ReaderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
