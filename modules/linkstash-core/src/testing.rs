//! Test mocks for the enrichment pipeline.
//!
//! One mock per trait boundary: `RecordingLayer` (AcquisitionLayer),
//! `FixedSynthesizer`/`FallbackSynthesizer` (MetadataSynthesizer),
//! `MockStore` (ItemStore), `MockNotifier` (Notifier). No network, no
//! database. `cargo test` in seconds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use linkstash_common::{
    AcquisitionResult, AcquisitionStatus, EnrichedMetadata, LinkStashError, NewItem, Platform,
    SavedItem,
};

use crate::acquire::AcquisitionLayer;
use crate::notify::Notifier;
use crate::store::ItemStore;
use crate::synthesizer::MetadataSynthesizer;

/// A minimal usable acquisition result with only a title.
pub fn acquired(title: &str) -> AcquisitionResult {
    AcquisitionResult {
        title: title.to_string(),
        caption: String::new(),
        body_excerpt: String::new(),
        status: AcquisitionStatus::Ok,
    }
}

// ---------------------------------------------------------------------------
// RecordingLayer
// ---------------------------------------------------------------------------

enum LayerOutcome {
    Succeed(AcquisitionResult),
    Empty,
    Fail,
}

/// Acquisition layer with a fixed outcome that counts its invocations.
pub struct RecordingLayer {
    name: &'static str,
    outcome: LayerOutcome,
    social_only: bool,
    calls: AtomicUsize,
}

impl RecordingLayer {
    pub fn succeeding(name: &'static str, result: AcquisitionResult) -> Self {
        Self {
            name,
            outcome: LayerOutcome::Succeed(result),
            social_only: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            outcome: LayerOutcome::Fail,
            social_only: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds with a result that has no content.
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            outcome: LayerOutcome::Empty,
            social_only: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Restrict the layer to social platforms, like the embed layer.
    pub fn social_only(mut self) -> Self {
        self.social_only = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AcquisitionLayer for RecordingLayer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn applies_to(&self, platform: Platform) -> bool {
        !self.social_only || platform.is_social()
    }

    async fn acquire(&self, url: &str, _platform: Platform) -> Result<AcquisitionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            LayerOutcome::Succeed(result) => Ok(result.clone()),
            LayerOutcome::Empty => Ok(AcquisitionResult {
                title: String::new(),
                caption: String::new(),
                body_excerpt: String::new(),
                status: AcquisitionStatus::Ok,
            }),
            LayerOutcome::Fail => bail!("RecordingLayer {}: forced failure for {url}", self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer mocks
// ---------------------------------------------------------------------------

/// Returns a fixed metadata value and counts invocations.
pub struct FixedSynthesizer {
    metadata: EnrichedMetadata,
    calls: AtomicUsize,
}

impl FixedSynthesizer {
    pub fn new(metadata: EnrichedMetadata) -> Self {
        Self {
            metadata,
            calls: AtomicUsize::new(0),
        }
    }

    /// A canned well-formed result.
    pub fn ok() -> Self {
        Self::new(EnrichedMetadata {
            title: "Fixed Title".to_string(),
            category: "Other".to_string(),
            summary: "A fixed test summary.".to_string(),
            hashtags: vec!["test".to_string()],
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSynthesizer for FixedSynthesizer {
    async fn synthesize(
        &self,
        _url: &str,
        _platform: Platform,
        _acquired: &AcquisitionResult,
    ) -> EnrichedMetadata {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.metadata.clone()
    }
}

/// Behaves like a synthesizer whose model call always fails: returns the
/// domain-derived fallback, exactly as the real implementation fails closed.
pub struct FallbackSynthesizer;

#[async_trait]
impl MetadataSynthesizer for FallbackSynthesizer {
    async fn synthesize(
        &self,
        url: &str,
        platform: Platform,
        _acquired: &AcquisitionResult,
    ) -> EnrichedMetadata {
        EnrichedMetadata::fallback(url, platform)
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

struct MockStoreInner {
    items: Vec<SavedItem>,
    existing_urls: Vec<String>,
    fail_on_create: bool,
    duplicate_on_create: bool,
}

/// Stateful in-memory item store. Thread-safe via interior Mutex.
pub struct MockStore {
    inner: Mutex<MockStoreInner>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockStoreInner {
                items: Vec::new(),
                existing_urls: Vec::new(),
                fail_on_create: false,
                duplicate_on_create: false,
            }),
        }
    }

    /// Pre-populate a URL so `exists` reports it without a full item.
    pub fn with_existing_url(self, url: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .existing_urls
            .push(url.to_string());
        self
    }

    /// Make every `create` fail with a store error.
    pub fn failing_creates(self) -> Self {
        self.inner.lock().unwrap().fail_on_create = true;
        self
    }

    /// Make every `create` report a unique-URL conflict, simulating a lost
    /// insert race.
    pub fn duplicate_on_create(self) -> Self {
        self.inner.lock().unwrap().duplicate_on_create = true;
        self
    }

    // --- Assertion helpers ---

    pub fn items_created(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn has_url(&self, url: &str) -> bool {
        self.inner.lock().unwrap().items.iter().any(|i| i.url == url)
    }

    pub fn item_by_url(&self, url: &str) -> Option<SavedItem> {
        self.inner
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.url == url)
            .cloned()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for MockStore {
    async fn exists(&self, url: &str) -> Result<bool, LinkStashError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.existing_urls.iter().any(|u| u == url)
            || inner.items.iter().any(|i| i.url == url))
    }

    async fn create(&self, item: NewItem) -> Result<SavedItem, LinkStashError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_on_create {
            return Err(LinkStashError::Store(
                "MockStore: create forced failure".to_string(),
            ));
        }
        if inner.duplicate_on_create
            || inner.existing_urls.iter().any(|u| *u == item.url)
            || inner.items.iter().any(|i| i.url == item.url)
        {
            return Err(LinkStashError::Duplicate(item.url));
        }

        let saved = SavedItem {
            id: Uuid::new_v4(),
            url: item.url,
            platform: item.platform,
            title: item.title,
            caption: item.caption,
            summary: item.summary,
            category: item.category,
            hashtags: item.hashtags,
            created_at: Utc::now(),
        };
        inner.items.push(saved.clone());
        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<SavedItem>, LinkStashError> {
        let inner = self.inner.lock().unwrap();
        let mut items = inner.items.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LinkStashError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.items.len();
        inner.items.retain(|i| i.id != id);
        Ok(inner.items.len() < before)
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Records every message; optionally fails each send.
pub struct MockNotifier {
    messages: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("MockNotifier: send forced failure");
        }
        self.messages
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockStore self-tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(url: &str) -> NewItem {
        NewItem {
            url: url.to_string(),
            platform: Platform::Web,
            title: "T".to_string(),
            caption: String::new(),
            summary: "S".to_string(),
            category: "Other".to_string(),
            hashtags: vec!["web".to_string()],
        }
    }

    #[tokio::test]
    async fn create_then_exists_and_lookup() {
        let store = MockStore::new();
        assert!(!store.exists("https://example.com/a").await.unwrap());

        store.create(new_item("https://example.com/a")).await.unwrap();

        assert!(store.exists("https://example.com/a").await.unwrap());
        assert!(store.has_url("https://example.com/a"));
        assert_eq!(store.items_created(), 1);
    }

    #[tokio::test]
    async fn second_create_for_same_url_is_duplicate() {
        let store = MockStore::new();
        store.create(new_item("https://example.com/a")).await.unwrap();

        let err = store
            .create(new_item("https://example.com/a"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.items_created(), 1);
    }

    #[tokio::test]
    async fn delete_removes_item() {
        let store = MockStore::new();
        let saved = store.create(new_item("https://example.com/a")).await.unwrap();

        assert!(store.delete(saved.id).await.unwrap());
        assert!(!store.delete(saved.id).await.unwrap());
        assert_eq!(store.items_created(), 0);
    }
}
