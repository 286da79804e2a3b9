//! Enrichment entry point: classify, acquire, synthesize.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use linkstash_common::{AcquisitionResult, Config, EnrichedMetadata, Platform};
use reader_client::ReaderClient;

use crate::acquire::AcquisitionChain;
use crate::synthesizer::{GeminiSynthesizer, MetadataSynthesizer};

/// Everything one enrichment run produced. The orchestrator persists from
/// this; other callers usually only want [`Enrichment::metadata`].
pub struct Enrichment {
    pub platform: Platform,
    pub acquired: AcquisitionResult,
    pub metadata: EnrichedMetadata,
}

pub struct Enricher {
    chain: AcquisitionChain,
    synthesizer: Arc<dyn MetadataSynthesizer>,
}

const READER_TIMEOUT: Duration = Duration::from_secs(15);

impl Enricher {
    pub fn new(chain: AcquisitionChain, synthesizer: Arc<dyn MetadataSynthesizer>) -> Self {
        Self { chain, synthesizer }
    }

    /// Standard wiring: four-layer chain + Gemini synthesizer, configured
    /// from the injected [`Config`] (no ambient process-wide state).
    pub fn from_config(config: &Config) -> Self {
        let reader = ReaderClient::new(&config.reader_base_url, READER_TIMEOUT);
        let synthesizer = Arc::new(GeminiSynthesizer::new(
            &config.gemini_api_key,
            &config.gemini_model,
        ));
        Self::new(AcquisitionChain::standard(reader), synthesizer)
    }

    /// Full enrichment for one URL. Never fails: the chain bottoms out at
    /// the stub and the synthesizer fails closed.
    pub async fn enrich_full(&self, url: &str, platform_hint: Option<Platform>) -> Enrichment {
        let platform = platform_hint.unwrap_or_else(|| Platform::from_url(url));
        info!(url, %platform, "Enriching URL");

        let acquired = self.chain.acquire(url, platform).await;
        let metadata = self.synthesizer.synthesize(url, platform, &acquired).await;

        Enrichment {
            platform,
            acquired,
            metadata,
        }
    }

    /// Metadata-only entry point for triggers that do not persist.
    pub async fn enrich(&self, url: &str, platform_hint: Option<Platform>) -> EnrichedMetadata {
        self.enrich_full(url, platform_hint).await.metadata
    }
}
