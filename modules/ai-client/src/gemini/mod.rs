mod client;
mod types;

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::debug;

use crate::schema::StructuredOutput;
use crate::util::strip_code_blocks;

use client::GeminiClient;
use types::GenerateRequest;

/// Handle on a Gemini model. Cheap to clone; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct Gemini {
    client: Arc<GeminiClient>,
    model: String,
}

impl Gemini {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Arc::new(GeminiClient::new(api_key)),
            model: model.to_string(),
        }
    }

    /// Point at a different API host (proxy or local stub).
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: Arc::new(GeminiClient::new(api_key).with_base_url(base_url)),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Free-form text completion.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest::new().system(system).user(prompt);

        let response = self.client.generate(&self.model, &request).await?;
        response
            .text()
            .ok_or_else(|| anyhow!("Gemini returned no candidates"))
    }

    /// Structured extraction: the response is constrained to a JSON document
    /// matching `T`'s schema and deserialized into `T`.
    pub async fn extract<T: StructuredOutput>(&self, system: &str, prompt: &str) -> Result<T> {
        debug!(
            model = self.model.as_str(),
            type_name = T::type_name(),
            "Gemini structured extraction"
        );

        let request = GenerateRequest::new()
            .system(system)
            .user(prompt)
            .temperature(0.0)
            .json_output(T::gemini_schema());

        let response = self.client.generate(&self.model, &request).await?;
        let text = response
            .text()
            .ok_or_else(|| anyhow!("Gemini returned no candidates"))?;

        serde_json::from_str(strip_code_blocks(&text))
            .with_context(|| format!("Failed to parse Gemini response as {}", T::type_name()))
    }
}
