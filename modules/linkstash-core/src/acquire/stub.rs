//! Stub fallback, the layer that cannot fail.

use anyhow::Result;
use async_trait::async_trait;

use linkstash_common::{domain_of, AcquisitionResult, AcquisitionStatus, Platform};

use super::AcquisitionLayer;

/// The minimal result used when every real strategy failed: just enough for
/// the synthesizer to produce domain-derived metadata, tagged restricted so
/// downstream consumers know no real content backs it.
pub fn restricted_stub(url: &str, platform: Platform) -> AcquisitionResult {
    let host = domain_of(url).unwrap_or_else(|| platform.as_str().to_string());
    AcquisitionResult {
        title: format!("Saved link from {host}"),
        caption: String::new(),
        body_excerpt: String::new(),
        status: AcquisitionStatus::Restricted,
    }
}

pub struct StubLayer;

#[async_trait]
impl AcquisitionLayer for StubLayer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn acquire(&self, url: &str, platform: Platform) -> Result<AcquisitionResult> {
        Ok(restricted_stub(url, platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_always_succeeds() {
        let result = StubLayer
            .acquire("https://www.instagram.com/p/abc/", Platform::Instagram)
            .await
            .unwrap();

        assert_eq!(result.status, AcquisitionStatus::Restricted);
        assert_eq!(result.title, "Saved link from www.instagram.com");
        assert!(result.has_content());
    }

    #[tokio::test]
    async fn stub_tolerates_garbage_urls() {
        let result = StubLayer
            .acquire("not a url", Platform::Web)
            .await
            .unwrap();

        assert_eq!(result.title, "Saved link from web");
        assert!(result.has_content());
    }
}
