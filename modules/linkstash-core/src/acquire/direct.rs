//! Generic fetch-and-parse.
//!
//! Plain HTTP GET with a desktop browser user agent, `<title>` parse, and
//! Readability extraction of the visible text. The last real layer before
//! the stub. It works for ordinary articles and blogs, which is most of
//! what people bookmark.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::debug;

use ai_client::util::truncate_to_char_boundary;
use linkstash_common::{AcquisitionResult, AcquisitionStatus, Platform};

use super::AcquisitionLayer;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const EXCERPT_MAX_BYTES: usize = 2_000;

pub struct DirectFetch {
    client: reqwest::Client,
}

impl DirectFetch {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_UA)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

fn title_from_html(html: &str) -> Option<String> {
    let title_re = regex::Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("valid regex");
    title_re
        .captures(html)
        .map(|cap| cap[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Readable main-content text via Readability extraction.
fn visible_text(html: &str, url: &str) -> String {
    let parsed_url = url::Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

#[async_trait]
impl AcquisitionLayer for DirectFetch {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn acquire(&self, url: &str, _platform: Platform) -> Result<AcquisitionResult> {
        debug!(url, layer = "direct", "Fetching page");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Direct fetch request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("Direct fetch returned status {status} for {url}");
        }

        let html = resp.text().await.context("Failed to read response body")?;
        if html.trim().is_empty() {
            bail!("Empty response body for {url}");
        }

        let title = title_from_html(&html).unwrap_or_default();
        let text = visible_text(&html, url);

        Ok(AcquisitionResult {
            title,
            caption: String::new(),
            body_excerpt: truncate_to_char_boundary(text.trim(), EXCERPT_MAX_BYTES).to_string(),
            status: AcquisitionStatus::Ok,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_tag() {
        let html = "<html><head><title>Example Domain</title></head><body>x</body></html>";
        assert_eq!(title_from_html(html).as_deref(), Some("Example Domain"));
    }

    #[test]
    fn title_tag_with_attributes() {
        let html = r#"<title data-rh="true"> Spaced Title </title>"#;
        assert_eq!(title_from_html(html).as_deref(), Some("Spaced Title"));
    }

    #[test]
    fn missing_title_is_none() {
        assert!(title_from_html("<html><body>no title</body></html>").is_none());
    }
}
