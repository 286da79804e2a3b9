//! Rendering/reader-service fetch.
//!
//! Delegates client-side rendering to a reader service that returns the page
//! as readable markdown. Catches the common failure where the service
//! renders a platform's login wall instead of the content.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use ai_client::util::truncate_to_char_boundary;
use linkstash_common::{AcquisitionResult, AcquisitionStatus, Platform};
use reader_client::ReaderClient;

use super::AcquisitionLayer;

/// Strings that mark a rendered login wall. Only the leading portion of the
/// text is checked; article bodies legitimately mention signing up.
const LOGIN_WALL_MARKERS: &[&str] = &[
    "Log in",
    "Log In",
    "Sign up",
    "Sign Up",
    "Create an account",
];

const LOGIN_WALL_WINDOW: usize = 600;

const EXCERPT_MAX_BYTES: usize = 2_000;

pub struct ReaderFetch {
    client: ReaderClient,
}

impl ReaderFetch {
    pub fn new(client: ReaderClient) -> Self {
        Self { client }
    }
}

fn looks_like_login_wall(text: &str) -> bool {
    let leading = truncate_to_char_boundary(text, LOGIN_WALL_WINDOW);
    LOGIN_WALL_MARKERS.iter().any(|m| leading.contains(m))
}

/// Reader services prefix the markdown with a `Title:` header line; plain
/// markdown starts with a `# ` heading. Take whichever comes first.
fn title_from_markdown(text: &str) -> Option<String> {
    for line in text.lines().take(10) {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Title:") {
            let title = rest.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
        if let Some(rest) = line.strip_prefix("# ") {
            let title = rest.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

/// Body text without the reader's header block, truncated for the prompt.
fn body_excerpt(text: &str) -> String {
    let body = match text.find("Markdown Content:") {
        Some(idx) => &text[idx + "Markdown Content:".len()..],
        None => text,
    };
    truncate_to_char_boundary(body.trim(), EXCERPT_MAX_BYTES).to_string()
}

#[async_trait]
impl AcquisitionLayer for ReaderFetch {
    fn name(&self) -> &'static str {
        "reader"
    }

    async fn acquire(&self, url: &str, _platform: Platform) -> Result<AcquisitionResult> {
        debug!(url, layer = "reader", "Fetching rendered text");

        let text = self
            .client
            .fetch(url)
            .await
            .context("Reader service request failed")?;

        if text.trim().is_empty() {
            bail!("Reader service returned empty text for {url}");
        }

        if looks_like_login_wall(&text) {
            bail!("Reader service rendered a login wall for {url}");
        }

        Ok(AcquisitionResult {
            title: title_from_markdown(&text).unwrap_or_default(),
            caption: String::new(),
            body_excerpt: body_excerpt(&text),
            status: AcquisitionStatus::Ok,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_login_wall_in_leading_portion() {
        let text = "Log in to continue\nInstagram\n...";
        assert!(looks_like_login_wall(text));
    }

    #[test]
    fn ignores_login_mention_deep_in_body() {
        let mut text = "A long article about something else entirely. ".repeat(40);
        text.push_str("Sign up for our newsletter at the bottom.");
        assert!(!looks_like_login_wall(&text));
    }

    #[test]
    fn title_from_reader_header() {
        let text = "Title: Example Article\nURL Source: https://example.com\n\nMarkdown Content:\nBody text here.";
        assert_eq!(title_from_markdown(text).as_deref(), Some("Example Article"));
    }

    #[test]
    fn title_from_heading() {
        let text = "# My Heading\n\nsome body";
        assert_eq!(title_from_markdown(text).as_deref(), Some("My Heading"));
    }

    #[test]
    fn no_title_in_plain_text() {
        assert!(title_from_markdown("just some text\nwith lines").is_none());
    }

    #[test]
    fn excerpt_skips_reader_header_block() {
        let text = "Title: T\nURL Source: u\n\nMarkdown Content:\nActual body.";
        assert_eq!(body_excerpt(text), "Actual body.");
    }

    #[test]
    fn excerpt_is_bounded() {
        let text = "x".repeat(10_000);
        assert!(body_excerpt(&text).len() <= EXCERPT_MAX_BYTES);
    }
}
