//! Metadata synthesis via one structured-output model call.
//!
//! The synthesizer is infallible by contract: a malformed response, a failed
//! call, or a network error yields the full domain-derived default instead
//! of an error. Category validation is advisory; values outside the
//! configured list are accepted as given.

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ai_client::util::truncate_to_char_boundary;
use ai_client::Gemini;
use linkstash_common::{AcquisitionResult, EnrichedMetadata, Platform, CATEGORIES};

/// Turns acquired content into fixed-shape metadata. Never fails; the
/// implementation owns its fallback.
#[async_trait]
pub trait MetadataSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        url: &str,
        platform: Platform,
        acquired: &AcquisitionResult,
    ) -> EnrichedMetadata;
}

/// What the model returns. Every field is optional so a partial response
/// still parses; defaults are applied in [`normalize`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SynthesisResponse {
    /// Display title, at most 80 characters
    pub title: Option<String>,
    /// One of the offered categories
    pub category: Option<String>,
    /// One-to-two sentence summary, at most 40 words
    pub summary: Option<String>,
    /// 2-5 lowercase hashtags without the # prefix
    #[serde(default)]
    pub hashtags: Vec<String>,
}

const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You are a bookmarking assistant. A user saved a link; you turn whatever content could be retrieved for it into display metadata.

Rules:
- Respond with a single JSON object only. No prose, no markdown.
- No emoji anywhere.
- title: a clean display title, at most 80 characters. Derive it from the content; strip site-name suffixes like " | Example.com".
- category: exactly one value, chosen from the list in the request.
- summary: one or two sentences, at most 40 words, describing what the link is about.
- hashtags: 2 to 5 short topical tags, lowercase, without the # prefix.

The retrieved content may be thin (a bare title, or nothing but the URL). Do your best from what is there; never refuse."#;

const BODY_PROMPT_LIMIT: usize = 8_000;

pub struct GeminiSynthesizer {
    gemini: Gemini,
}

impl GeminiSynthesizer {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            gemini: Gemini::new(api_key, model),
        }
    }

    /// Wrap a pre-configured client (custom base URL or model).
    pub fn from_client(gemini: Gemini) -> Self {
        Self { gemini }
    }

    fn build_prompt(url: &str, platform: Platform, acquired: &AcquisitionResult) -> String {
        format!(
            "Link: {url}\nPlatform: {platform}\nCategories: {categories}\n\nRetrieved title: {title}\nRetrieved description: {caption}\nRetrieved body excerpt:\n{body}",
            categories = CATEGORIES.join(", "),
            title = acquired.title,
            caption = acquired.caption,
            body = truncate_to_char_boundary(&acquired.body_excerpt, BODY_PROMPT_LIMIT),
        )
    }

    async fn try_synthesize(
        &self,
        url: &str,
        platform: Platform,
        acquired: &AcquisitionResult,
    ) -> Result<EnrichedMetadata> {
        let prompt = Self::build_prompt(url, platform, acquired);
        let response: SynthesisResponse = self
            .gemini
            .extract(SYNTHESIS_SYSTEM_PROMPT, &prompt)
            .await?;
        Ok(normalize(response, url, platform, acquired))
    }
}

/// Apply the documented per-field defaults to a parsed model response.
pub(crate) fn normalize(
    response: SynthesisResponse,
    url: &str,
    platform: Platform,
    acquired: &AcquisitionResult,
) -> EnrichedMetadata {
    let title = response
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| {
            if acquired.title.trim().is_empty() {
                format!("Saved {platform} link")
            } else {
                acquired.title.clone()
            }
        });

    let category = response
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "Other".to_string());
    if !CATEGORIES.contains(&category.as_str()) {
        debug!(url, category = category.as_str(), "Category outside configured list, keeping as-is");
    }

    let summary = response
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("Saved {platform} content."));

    let hashtags: Vec<String> = response
        .hashtags
        .into_iter()
        .map(|h| h.trim().trim_start_matches('#').to_lowercase())
        .filter(|h| !h.is_empty())
        .collect();
    let hashtags = if hashtags.is_empty() {
        vec![platform.as_str().to_string()]
    } else {
        hashtags
    };

    EnrichedMetadata {
        title,
        category,
        summary,
        hashtags,
    }
}

#[async_trait]
impl MetadataSynthesizer for GeminiSynthesizer {
    async fn synthesize(
        &self,
        url: &str,
        platform: Platform,
        acquired: &AcquisitionResult,
    ) -> EnrichedMetadata {
        match self.try_synthesize(url, platform, acquired).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(url, error = %e, "Synthesis failed, using fallback metadata");
                EnrichedMetadata::fallback(url, platform)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::acquired;

    fn full_response() -> SynthesisResponse {
        SynthesisResponse {
            title: Some("Example Domain Overview".to_string()),
            category: Some("Other".to_string()),
            summary: Some("A placeholder example page used for documentation.".to_string()),
            hashtags: vec!["example".to_string(), "web".to_string()],
        }
    }

    #[test]
    fn well_formed_response_passes_through() {
        let meta = normalize(
            full_response(),
            "https://example.com/article",
            Platform::Web,
            &acquired("Example Domain"),
        );

        assert_eq!(meta.title, "Example Domain Overview");
        assert_eq!(meta.category, "Other");
        assert_eq!(
            meta.summary,
            "A placeholder example page used for documentation."
        );
        assert_eq!(meta.hashtags, vec!["example", "web"]);
    }

    #[test]
    fn missing_title_falls_back_to_acquired_title() {
        let response = SynthesisResponse {
            title: None,
            ..full_response()
        };
        let meta = normalize(
            response,
            "https://example.com",
            Platform::Web,
            &acquired("Acquired Title"),
        );
        assert_eq!(meta.title, "Acquired Title");
    }

    #[test]
    fn missing_title_and_acquisition_title_yields_platform_stub() {
        let response = SynthesisResponse {
            title: Some("   ".to_string()),
            ..full_response()
        };
        let meta = normalize(
            response,
            "https://x.com/u/status/1",
            Platform::Twitter,
            &acquired(""),
        );
        assert_eq!(meta.title, "Saved twitter link");
    }

    #[test]
    fn missing_category_defaults_to_other() {
        let response = SynthesisResponse {
            category: None,
            ..full_response()
        };
        let meta = normalize(response, "https://example.com", Platform::Web, &acquired("t"));
        assert_eq!(meta.category, "Other");
    }

    #[test]
    fn unknown_category_is_accepted_as_given() {
        let response = SynthesisResponse {
            category: Some("Quantum Gardening".to_string()),
            ..full_response()
        };
        let meta = normalize(response, "https://example.com", Platform::Web, &acquired("t"));
        assert_eq!(meta.category, "Quantum Gardening");
    }

    #[test]
    fn missing_summary_gets_generic_sentence() {
        let response = SynthesisResponse {
            summary: None,
            ..full_response()
        };
        let meta = normalize(
            response,
            "https://instagram.com/p/1",
            Platform::Instagram,
            &acquired("t"),
        );
        assert_eq!(meta.summary, "Saved instagram content.");
    }

    #[test]
    fn hashtags_are_cleaned_and_defaulted() {
        let response = SynthesisResponse {
            hashtags: vec!["#Food".to_string(), "  ".to_string(), "recipes".to_string()],
            ..full_response()
        };
        let meta = normalize(response, "https://example.com", Platform::Web, &acquired("t"));
        assert_eq!(meta.hashtags, vec!["food", "recipes"]);

        let response = SynthesisResponse {
            hashtags: Vec::new(),
            ..full_response()
        };
        let meta = normalize(
            response,
            "https://tiktok.com/@u/video/1",
            Platform::TikTok,
            &acquired("t"),
        );
        assert_eq!(meta.hashtags, vec!["tiktok"]);
    }

    #[test]
    fn prompt_embeds_all_inputs() {
        let acq = AcquisitionResult {
            title: "T1".to_string(),
            caption: "C1".to_string(),
            body_excerpt: "B1".to_string(),
            status: linkstash_common::AcquisitionStatus::Ok,
        };
        let prompt =
            GeminiSynthesizer::build_prompt("https://example.com/a", Platform::Web, &acq);

        assert!(prompt.contains("https://example.com/a"));
        assert!(prompt.contains("Platform: web"));
        assert!(prompt.contains("T1"));
        assert!(prompt.contains("C1"));
        assert!(prompt.contains("B1"));
        for category in CATEGORIES {
            assert!(prompt.contains(category));
        }
    }

    #[test]
    fn partial_json_still_parses() {
        // The schema marks every field optional; a bare object must parse.
        let response: SynthesisResponse = serde_json::from_str("{}").unwrap();
        let meta = normalize(response, "https://example.com", Platform::Web, &acquired("t"));
        assert!(!meta.title.is_empty());
        assert!(!meta.category.is_empty());
        assert!(!meta.summary.is_empty());
        assert!(!meta.hashtags.is_empty());
    }
}
