use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// The closed category list offered to the model. Values outside this list
/// are accepted as-is (validation is advisory).
pub const CATEGORIES: &[&str] = &[
    "Fitness", "Coding", "Food", "Travel", "Design", "Music", "Fashion", "Finance", "News",
    "Other",
];

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Content platform a URL belongs to. `Instagram`/`TikTok` cover the
/// short-video/story class, `Twitter` the microblog class, `Web` everything
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    TikTok,
    Twitter,
    Web,
}

impl Platform {
    /// Classify a URL by hostname. Total: any input (including unparseable
    /// strings) yields a platform, falling back to `Web`.
    pub fn from_url(url: &str) -> Self {
        let host = match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(h) => h.to_lowercase(),
                None => return Platform::Web,
            },
            Err(_) => return Platform::Web,
        };

        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if matches("instagram.com") {
            Platform::Instagram
        } else if matches("tiktok.com") {
            Platform::TikTok
        } else if matches("twitter.com") || matches("x.com") {
            Platform::Twitter
        } else {
            Platform::Web
        }
    }

    /// Inverse of [`Platform::as_str`]. Unknown tags (e.g. from a hand-edited
    /// database row) fall back to `Web`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "instagram" => Platform::Instagram,
            "tiktok" => Platform::TikTok,
            "twitter" => Platform::Twitter,
            _ => Platform::Web,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Twitter => "twitter",
            Platform::Web => "web",
        }
    }

    /// Social platforms show generic crawlers richer metadata than browsers;
    /// the embed-fetch acquisition layer only applies to these.
    pub fn is_social(&self) -> bool {
        !matches!(self, Platform::Web)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registrable-ish domain of a URL, for user-facing fallbacks.
/// `https://www.example.com/a` → `www.example.com`.
pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Acquisition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStatus {
    /// A real layer produced human-meaningful content.
    Ok,
    /// Every real layer failed; this is the minimal stub.
    Restricted,
}

/// Content one acquisition layer retrieved for a URL. Produced by exactly one
/// layer (first success wins) and consumed only by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionResult {
    pub title: String,
    pub caption: String,
    pub body_excerpt: String,
    pub status: AcquisitionStatus,
}

impl AcquisitionResult {
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
            || !self.caption.trim().is_empty()
            || !self.body_excerpt.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Enriched metadata
// ---------------------------------------------------------------------------

/// Fully-populated metadata for a saved link. Never partially null: every
/// field has a deterministic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMetadata {
    pub title: String,
    pub category: String,
    pub summary: String,
    pub hashtags: Vec<String>,
}

impl EnrichedMetadata {
    /// The full default, derived purely from the URL's domain. Used when
    /// synthesis fails closed.
    pub fn fallback(url: &str, platform: Platform) -> Self {
        let host = domain_of(url).unwrap_or_else(|| "the web".to_string());
        Self {
            title: format!("Link from {host}"),
            category: "Other".to_string(),
            summary: format!("Saved link from {host}."),
            hashtags: vec![platform.as_str().to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Saved items
// ---------------------------------------------------------------------------

/// A bookmark ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub url: String,
    pub platform: Platform,
    pub title: String,
    pub caption: String,
    pub summary: String,
    pub category: String,
    pub hashtags: Vec<String>,
}

/// A persisted bookmark. Created exactly once per distinct URL, never
/// mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: Uuid,
    pub url: String,
    pub platform: Platform,
    pub title: String,
    pub caption: String,
    pub summary: String,
    pub category: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_instagram() {
        assert_eq!(
            Platform::from_url("https://www.instagram.com/p/abc123/"),
            Platform::Instagram
        );
        assert_eq!(
            Platform::from_url("https://INSTAGRAM.com/reel/xyz"),
            Platform::Instagram
        );
    }

    #[test]
    fn classifies_tiktok() {
        assert_eq!(
            Platform::from_url("https://www.tiktok.com/@user/video/123"),
            Platform::TikTok
        );
    }

    #[test]
    fn classifies_twitter_and_x() {
        assert_eq!(
            Platform::from_url("https://twitter.com/user/status/1"),
            Platform::Twitter
        );
        assert_eq!(Platform::from_url("https://x.com/user/status/1"), Platform::Twitter);
    }

    #[test]
    fn unknown_domains_fall_to_web() {
        assert_eq!(Platform::from_url("https://example.com/post"), Platform::Web);
        assert_eq!(Platform::from_url("https://myinstagram.example.net"), Platform::Web);
    }

    #[test]
    fn classifier_is_total_on_garbage() {
        for input in ["", "not a url", "ftp://weird", "https://", "🦀🦀🦀"] {
            // Must never panic, must always yield a tag
            let _ = Platform::from_url(input);
        }
        assert_eq!(Platform::from_url("not a url"), Platform::Web);
    }

    #[test]
    fn tag_round_trip() {
        for platform in [
            Platform::Instagram,
            Platform::TikTok,
            Platform::Twitter,
            Platform::Web,
        ] {
            assert_eq!(Platform::from_tag(platform.as_str()), platform);
        }
        assert_eq!(Platform::from_tag("myspace"), Platform::Web);
    }

    #[test]
    fn lookalike_domain_is_not_matched() {
        // "notinstagram.com" contains "instagram.com" but is a different host
        assert_eq!(
            Platform::from_url("https://notinstagram.com/p/1"),
            Platform::Web
        );
    }

    #[test]
    fn fallback_metadata_is_fully_populated() {
        let meta = EnrichedMetadata::fallback("https://example.com/a", Platform::Web);
        assert_eq!(meta.title, "Link from example.com");
        assert_eq!(meta.category, "Other");
        assert!(!meta.summary.is_empty());
        assert_eq!(meta.hashtags, vec!["web".to_string()]);
    }

    #[test]
    fn fallback_metadata_survives_garbage_url() {
        let meta = EnrichedMetadata::fallback("not a url", Platform::Web);
        assert!(!meta.title.is_empty());
        assert!(!meta.summary.is_empty());
        assert!(!meta.hashtags.is_empty());
    }

    #[test]
    fn acquisition_result_content_check() {
        let empty = AcquisitionResult {
            title: "  ".to_string(),
            caption: String::new(),
            body_excerpt: String::new(),
            status: AcquisitionStatus::Ok,
        };
        assert!(!empty.has_content());

        let titled = AcquisitionResult {
            title: "Example Domain".to_string(),
            caption: String::new(),
            body_excerpt: String::new(),
            status: AcquisitionStatus::Ok,
        };
        assert!(titled.has_content());
    }
}
