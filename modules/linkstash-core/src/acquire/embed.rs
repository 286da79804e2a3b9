//! Bot-friendly mirror/spoof fetch.
//!
//! Social platforms serve generic crawlers richer open-graph metadata than
//! they serve browsers, and several have community mirrors that exist solely
//! to return unauthenticated previews. This layer fetches with a crawler
//! user agent, via a mirror host where one is known, and parses metadata
//! tags out of the response head.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use linkstash_common::{AcquisitionResult, AcquisitionStatus, Platform};

use super::AcquisitionLayer;

/// The user agent the mirrors (and the platforms themselves) whitelist for
/// link-preview rendering.
const CRAWLER_UA: &str =
    "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";

/// Only the document head is scanned for metadata tags.
const HEAD_LIMIT: usize = 50_000;

pub struct EmbedFetch {
    client: reqwest::Client,
}

impl EmbedFetch {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(CRAWLER_UA)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

/// Rewrite the URL onto a mirror host that serves unauthenticated previews,
/// when one is known for the platform. Others are fetched directly; the
/// crawler user agent alone is often enough.
fn mirror_url(url: &str, platform: Platform) -> Result<String> {
    let mut parsed = Url::parse(url).context("Invalid URL")?;
    let mirror = match platform {
        Platform::Twitter => Some("fxtwitter.com"),
        Platform::Instagram => Some("ddinstagram.com"),
        _ => None,
    };
    if let Some(host) = mirror {
        parsed
            .set_host(Some(host))
            .context("Failed to rewrite mirror host")?;
    }
    Ok(parsed.to_string())
}

/// Parsed document metadata: og:title / og:description / og:site_name with a
/// `<title>` fallback. Handles both attribute orders.
struct MetaTags {
    title: Option<String>,
    description: Option<String>,
    site_name: Option<String>,
}

fn extract_meta_tags(html: &str) -> MetaTags {
    let head = if let Some(end) = html[..html.len().min(HEAD_LIMIT)].find("</head>") {
        &html[..end]
    } else {
        &html[..html.len().min(HEAD_LIMIT)]
    };

    let og_re = regex::Regex::new(
        r#"(?i)<meta\s+(?:[^>]*?\s)?(?:property|name)\s*=\s*["']og:(\w+)["'][^>]*?\scontent\s*=\s*["']([^"']*)["'][^>]*/?\s*>"#,
    )
    .expect("valid regex");

    let og_rev_re = regex::Regex::new(
        r#"(?i)<meta\s+(?:[^>]*?\s)?content\s*=\s*["']([^"']*)["'][^>]*?\s(?:property|name)\s*=\s*["']og:(\w+)["'][^>]*/?\s*>"#,
    )
    .expect("valid regex");

    let mut title = None;
    let mut description = None;
    let mut site_name = None;

    // property/name before content
    for cap in og_re.captures_iter(head) {
        let key = cap[1].to_lowercase();
        let value = cap[2].to_string();
        match key.as_str() {
            "title" if title.is_none() => title = Some(value),
            "description" if description.is_none() => description = Some(value),
            "site_name" if site_name.is_none() => site_name = Some(value),
            _ => {}
        }
    }

    // content before property/name
    for cap in og_rev_re.captures_iter(head) {
        let value = cap[1].to_string();
        let key = cap[2].to_lowercase();
        match key.as_str() {
            "title" if title.is_none() => title = Some(value),
            "description" if description.is_none() => description = Some(value),
            "site_name" if site_name.is_none() => site_name = Some(value),
            _ => {}
        }
    }

    if title.is_none() {
        let title_re =
            regex::Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("valid regex");
        if let Some(cap) = title_re.captures(head) {
            title = Some(cap[1].trim().to_string());
        }
    }

    MetaTags {
        title,
        description,
        site_name,
    }
}

#[async_trait]
impl AcquisitionLayer for EmbedFetch {
    fn name(&self) -> &'static str {
        "embed"
    }

    fn applies_to(&self, platform: Platform) -> bool {
        platform.is_social()
    }

    async fn acquire(&self, url: &str, platform: Platform) -> Result<AcquisitionResult> {
        let target = mirror_url(url, platform)?;

        debug!(url, mirror = target.as_str(), layer = "embed", "Fetching preview metadata");

        let resp = self
            .client
            .get(&target)
            .send()
            .await
            .context("Embed fetch request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("Embed fetch returned status {status} for {target}");
        }

        let html = resp.text().await.context("Failed to read embed response")?;
        let tags = extract_meta_tags(&html);

        if tags.title.is_none() && tags.description.is_none() {
            bail!("No preview metadata in response from {target}");
        }

        let title = tags
            .title
            .or(tags.site_name)
            .unwrap_or_default();

        Ok(AcquisitionResult {
            title,
            caption: tags.description.unwrap_or_default(),
            body_excerpt: String::new(),
            status: AcquisitionStatus::Ok,
        })
    }
}
