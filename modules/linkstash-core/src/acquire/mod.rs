//! Acquisition layer chain.
//!
//! Given a URL and its platform, each layer attempts to retrieve
//! human-meaningful content (title, caption, body excerpt) with its own
//! network behavior and failure mode. The chain tries layers in a fixed
//! priority order and stops at the first usable result. It never raises:
//! the terminal stub layer always succeeds, and even a chain misconfigured
//! without one falls back to the restricted stub.

pub mod direct;
pub mod embed;
pub mod reader;
pub mod stub;

pub use direct::DirectFetch;
pub use embed::EmbedFetch;
pub use reader::ReaderFetch;
pub use stub::{restricted_stub, StubLayer};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use linkstash_common::{AcquisitionResult, Platform};
use reader_client::ReaderClient;

/// One strategy for extracting readable metadata from a URL.
///
/// Implementations own their timeout and must not let network errors escape
/// as anything other than an `Err`: the chain treats any error as "this
/// layer failed, try the next".
#[async_trait]
pub trait AcquisitionLayer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this layer is worth trying for the given platform.
    fn applies_to(&self, platform: Platform) -> bool {
        let _ = platform;
        true
    }

    async fn acquire(&self, url: &str, platform: Platform) -> Result<AcquisitionResult>;
}

/// Ordered chain of acquisition layers. First usable result wins.
pub struct AcquisitionChain {
    layers: Vec<Arc<dyn AcquisitionLayer>>,
}

impl AcquisitionChain {
    pub fn new(layers: Vec<Arc<dyn AcquisitionLayer>>) -> Self {
        Self { layers }
    }

    /// The standard four-layer chain: crawler-spoof embed fetch for social
    /// platforms, reader-service rendering, generic fetch-and-parse, stub.
    pub fn standard(reader: ReaderClient) -> Self {
        let layers: Vec<Arc<dyn AcquisitionLayer>> = vec![
            Arc::new(EmbedFetch::new(Duration::from_secs(10))),
            Arc::new(ReaderFetch::new(reader)),
            Arc::new(DirectFetch::new(Duration::from_secs(10))),
            Arc::new(StubLayer),
        ];
        Self::new(layers)
    }

    /// Try layers in priority order. Never fails; worst case is the
    /// restricted stub.
    pub async fn acquire(&self, url: &str, platform: Platform) -> AcquisitionResult {
        for layer in &self.layers {
            if !layer.applies_to(platform) {
                debug!(url, layer = layer.name(), %platform, "Layer not applicable, skipping");
                continue;
            }

            match layer.acquire(url, platform).await {
                Ok(result) if result.has_content() => {
                    info!(url, layer = layer.name(), "Content acquired");
                    return result;
                }
                Ok(_) => {
                    debug!(url, layer = layer.name(), "Layer returned no content, trying next");
                }
                Err(e) => {
                    warn!(url, layer = layer.name(), error = %e, "Layer failed, trying next");
                }
            }
        }

        warn!(url, "All acquisition layers exhausted, using restricted stub");
        restricted_stub(url, platform)
    }
}
