use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Gemini
    pub gemini_api_key: String,
    pub gemini_model: String,

    // WhatsApp Cloud API
    pub whatsapp_access_token: String,
    pub whatsapp_phone_number_id: String,
    pub whatsapp_verify_token: String,

    // Storage
    pub database_url: String,

    // Reader service (rendering fallback)
    pub reader_base_url: String,

    // Web server
    pub host: String,
    pub port: u16,

    /// Public URL to self-ping so free-tier hosts don't idle the process.
    /// Keep-alive is disabled when unset.
    pub keepalive_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: required_env("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-3.0-flash".to_string()),
            whatsapp_access_token: required_env("WHATSAPP_ACCESS_TOKEN"),
            whatsapp_phone_number_id: required_env("WHATSAPP_PHONE_NUMBER_ID"),
            whatsapp_verify_token: required_env("WHATSAPP_VERIFY_TOKEN"),
            database_url: required_env("DATABASE_URL"),
            reader_base_url: env::var("READER_BASE_URL")
                .unwrap_or_else(|_| "https://r.jina.ai".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("PORT must be a number"),
            keepalive_url: env::var("KEEPALIVE_URL")
                .or_else(|_| env::var("RENDER_EXTERNAL_URL"))
                .ok()
                .filter(|u| !u.trim().is_empty()),
        }
    }

    /// Log the non-secret parts of the configuration.
    pub fn log_redacted(&self) {
        info!(
            model = self.gemini_model.as_str(),
            reader = self.reader_base_url.as_str(),
            host = self.host.as_str(),
            port = self.port,
            keepalive = self.keepalive_url.is_some(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
