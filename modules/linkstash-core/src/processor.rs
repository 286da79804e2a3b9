//! Background enrichment orchestration.
//!
//! One unit of work per submitted URL: duplicate check, enrich, persist,
//! notify. Acquisition and synthesis cannot fail by construction; anything
//! unexpected after that is caught at this boundary, logged, and swallowed;
//! the webhook trigger has already been acknowledged, and the store's
//! uniqueness constraint guarantees no duplicate or corrupt record either
//! way.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use linkstash_common::{NewItem, SavedItem};

use crate::enricher::Enricher;
use crate::notify::Notifier;
use crate::store::ItemStore;

pub const DUPLICATE_REPLY: &str = "You already saved this link.";

pub fn saved_reply(item: &SavedItem) -> String {
    format!(
        "Got it! Saved to your '{}' bucket.\n\nSummary: {}",
        item.category, item.summary
    )
}

pub struct Processor {
    store: Arc<dyn ItemStore>,
    enricher: Enricher,
    notifier: Arc<dyn Notifier>,
}

impl Processor {
    pub fn new(store: Arc<dyn ItemStore>, enricher: Enricher, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            enricher,
            notifier,
        }
    }

    /// Launch a detached background unit for one URL. The caller returns
    /// immediately; the unit runs to completion or failure on its own.
    pub fn spawn(self: Arc<Self>, url: String, recipient: String) {
        tokio::spawn(async move {
            self.process_and_notify(&url, &recipient).await;
        });
    }

    /// Full pipeline for one URL. Never panics or returns an error; failures
    /// end the unit with a log line only.
    pub async fn process_and_notify(&self, url: &str, recipient: &str) {
        if let Err(e) = self.run(url, recipient).await {
            error!(url, error = %e, "Enrichment unit failed");
        }
    }

    async fn run(&self, url: &str, recipient: &str) -> Result<()> {
        if self.store.exists(url).await? {
            info!(url, "URL already saved, skipping pipeline");
            self.notify(recipient, DUPLICATE_REPLY).await;
            return Ok(());
        }

        let enrichment = self.enricher.enrich_full(url, None).await;

        let item = NewItem {
            url: url.to_string(),
            platform: enrichment.platform,
            title: enrichment.metadata.title.clone(),
            caption: enrichment.acquired.caption.clone(),
            summary: enrichment.metadata.summary.clone(),
            category: enrichment.metadata.category.clone(),
            hashtags: enrichment.metadata.hashtags.clone(),
        };

        match self.store.create(item).await {
            Ok(saved) => {
                info!(url, category = saved.category.as_str(), "Item persisted");
                self.notify(recipient, &saved_reply(&saved)).await;
            }
            Err(e) if e.is_duplicate() => {
                // Another unit won the insert race between our exists check
                // and the create. Same outcome as the short-circuit path.
                info!(url, "Duplicate insert race, notifying as already saved");
                self.notify(recipient, DUPLICATE_REPLY).await;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    async fn notify(&self, to: &str, body: &str) {
        if let Err(e) = self.notifier.send(to, body).await {
            warn!(to, error = %e, "Notification send failed (not retried)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::acquire::{AcquisitionChain, StubLayer};
    use crate::testing::{
        acquired, FixedSynthesizer, MockNotifier, MockStore, RecordingLayer,
    };
    use linkstash_common::{EnrichedMetadata, Platform};

    struct Fixture {
        store: Arc<MockStore>,
        notifier: Arc<MockNotifier>,
        layer: Arc<RecordingLayer>,
        synthesizer: Arc<FixedSynthesizer>,
        processor: Arc<Processor>,
    }

    fn fixture(store: MockStore, layer: RecordingLayer, synthesizer: FixedSynthesizer) -> Fixture {
        let store = Arc::new(store);
        let notifier = Arc::new(MockNotifier::new());
        let layer = Arc::new(layer);
        let synthesizer = Arc::new(synthesizer);
        let chain = AcquisitionChain::new(vec![
            layer.clone() as Arc<dyn crate::acquire::AcquisitionLayer>,
            Arc::new(StubLayer),
        ]);
        let enricher = Enricher::new(chain, synthesizer.clone());
        let processor = Arc::new(Processor::new(
            store.clone(),
            enricher,
            notifier.clone(),
        ));
        Fixture {
            store,
            notifier,
            layer,
            synthesizer,
            processor,
        }
    }

    #[tokio::test]
    async fn duplicate_url_short_circuits_the_pipeline() {
        let f = fixture(
            MockStore::new().with_existing_url("https://example.com/dup"),
            RecordingLayer::succeeding("layer", acquired("T")),
            FixedSynthesizer::ok(),
        );

        f.processor
            .process_and_notify("https://example.com/dup", "15551234567")
            .await;

        // Chain and synthesizer never ran; exactly one duplicate notice sent.
        assert_eq!(f.layer.calls(), 0);
        assert_eq!(f.synthesizer.calls(), 0);
        assert_eq!(f.store.items_created(), 0);
        assert_eq!(
            f.notifier.messages(),
            vec![("15551234567".to_string(), DUPLICATE_REPLY.to_string())]
        );
    }

    #[tokio::test]
    async fn fresh_url_creates_one_record_and_one_notification() {
        let f = fixture(
            MockStore::new(),
            RecordingLayer::succeeding("layer", acquired("T")),
            FixedSynthesizer::ok(),
        );

        f.processor
            .process_and_notify("https://example.com/fresh", "15551234567")
            .await;

        assert_eq!(f.store.items_created(), 1);
        assert!(f.store.has_url("https://example.com/fresh"));

        let messages = f.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("Saved to your"));
        assert!(!messages[0].1.contains("already saved"));
    }

    #[tokio::test]
    async fn lost_insert_race_is_reported_as_already_saved() {
        let f = fixture(
            MockStore::new().duplicate_on_create(),
            RecordingLayer::succeeding("layer", acquired("T")),
            FixedSynthesizer::ok(),
        );

        f.processor
            .process_and_notify("https://example.com/race", "15551234567")
            .await;

        assert_eq!(f.store.items_created(), 0);
        assert_eq!(
            f.notifier.messages(),
            vec![("15551234567".to_string(), DUPLICATE_REPLY.to_string())]
        );
    }

    #[tokio::test]
    async fn store_failure_terminates_without_notifying() {
        let f = fixture(
            MockStore::new().failing_creates(),
            RecordingLayer::succeeding("layer", acquired("T")),
            FixedSynthesizer::ok(),
        );

        f.processor
            .process_and_notify("https://example.com/broken", "15551234567")
            .await;

        assert_eq!(f.store.items_created(), 0);
        assert!(f.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_pipeline() {
        let store = Arc::new(MockStore::new());
        let notifier = Arc::new(MockNotifier::failing());
        let chain = AcquisitionChain::new(vec![
            Arc::new(StubLayer) as Arc<dyn crate::acquire::AcquisitionLayer>
        ]);
        let enricher = Enricher::new(chain, Arc::new(FixedSynthesizer::ok()));
        let processor = Processor::new(store.clone(), enricher, notifier.clone());

        processor
            .process_and_notify("https://example.com/noreply", "15551234567")
            .await;

        // The record still exists even though the user heard nothing.
        assert_eq!(store.items_created(), 1);
        assert_eq!(notifier.attempts(), 1);
    }

    #[tokio::test]
    async fn generic_web_scenario_end_to_end() {
        // Layers 1-2 fail, layer 3 supplies the page title, the synthesizer
        // returns the exact metadata the model would.
        let store = Arc::new(MockStore::new());
        let notifier = Arc::new(MockNotifier::new());
        let chain = AcquisitionChain::new(vec![
            Arc::new(RecordingLayer::succeeding("embed", acquired("unused")).social_only())
                as Arc<dyn crate::acquire::AcquisitionLayer>,
            Arc::new(RecordingLayer::failing("reader")),
            Arc::new(RecordingLayer::succeeding("direct", acquired("Example Domain"))),
            Arc::new(StubLayer),
        ]);
        let synthesizer = Arc::new(FixedSynthesizer::new(EnrichedMetadata {
            title: "Example Domain Overview".to_string(),
            category: "Other".to_string(),
            summary: "A placeholder example page used for documentation.".to_string(),
            hashtags: vec!["example".to_string(), "web".to_string()],
        }));
        let enricher = Enricher::new(chain, synthesizer.clone());
        let processor = Processor::new(store.clone(), enricher, notifier.clone());

        processor
            .process_and_notify("https://example.com/article", "15551234567")
            .await;

        let item = store.item_by_url("https://example.com/article").unwrap();
        assert_eq!(item.platform, Platform::Web);
        assert_eq!(item.category, "Other");
        assert_eq!(item.hashtags, vec!["example", "web"]);
        assert_eq!(item.title, "Example Domain Overview");

        assert_eq!(synthesizer.calls(), 1);
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("'Other' bucket"));
    }
}
