pub mod error;
pub mod webhook;

pub use error::{Result, WhatsAppError};
pub use webhook::WebhookPayload;

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

const GRAPH_API_URL: &str = "https://graph.facebook.com/v21.0";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for sending messages through the Meta WhatsApp Cloud API.
pub struct WhatsAppClient {
    http: reqwest::Client,
    access_token: String,
    phone_number_id: String,
    base_url: String,
}

#[derive(Serialize)]
struct SendTextRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextPayload<'a>,
}

#[derive(Serialize)]
struct TextPayload<'a> {
    body: &'a str,
}

impl WhatsAppClient {
    pub fn new(access_token: &str, phone_number_id: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            access_token: access_token.to_string(),
            phone_number_id: phone_number_id.to_string(),
            base_url: GRAPH_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Send a plain text message to a phone number.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);

        debug!(to, "Sending WhatsApp message");

        let request = SendTextRequest {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextPayload { body },
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
