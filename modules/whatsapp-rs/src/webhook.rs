//! Inbound webhook payload types for the WhatsApp Cloud API.
//!
//! Meta nests the interesting part four levels deep:
//! `entry[0].changes[0].value.messages[0]`. Every level is optional in
//! practice (status callbacks arrive on the same endpoint), so all fields
//! default to empty and callers use [`WebhookPayload::first_text_message`].

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Sender phone number in international format, no leading `+`.
    #[serde(default)]
    pub from: String,
    #[serde(rename = "type", default)]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

impl WebhookPayload {
    /// The first text message in the payload, as `(sender, body)`.
    /// Returns `None` for status callbacks and non-text messages.
    pub fn first_text_message(&self) -> Option<(&str, &str)> {
        let message = self
            .entry
            .first()?
            .changes
            .first()?
            .value
            .as_ref()?
            .messages
            .first()?;
        let body = message.text.as_ref()?.body.trim();
        if body.is_empty() {
            return None;
        }
        Some((message.from.as_str(), body))
    }
}
