use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, warn};

use whatsapp::WebhookPayload;

use crate::AppState;

const USAGE_HINT: &str =
    "Hi! Send me a link from Instagram, TikTok, Twitter, or the web, and I'll save it for you.";

/// Meta webhook verification handshake: echo `hub.challenge` when the verify
/// token matches, 403 otherwise.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

    if mode == Some("subscribe") && token == Some(state.verify_token.as_str()) {
        info!("Webhook verified");
        (StatusCode::OK, challenge).into_response()
    } else {
        (StatusCode::FORBIDDEN, "Verification failed").into_response()
    }
}

/// Inbound message intake. Always acknowledges with 200; Meta retries
/// anything else, and the pipeline runs as a detached background unit
/// regardless of its outcome.
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let payload: WebhookPayload = match serde_json::from_value(body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Unparseable webhook payload");
            return StatusCode::OK;
        }
    };

    let Some((from, text)) = payload.first_text_message() else {
        // Status callback or non-text message
        return StatusCode::OK;
    };

    match extract_first_url(text) {
        Some(url) => {
            info!(url, "URL received, launching enrichment");
            state.processor.clone().spawn(url, from.to_string());
        }
        None => {
            let notifier = state.notifier.clone();
            let to = from.to_string();
            tokio::spawn(async move {
                if let Err(e) = notifier.send(&to, USAGE_HINT).await {
                    warn!(error = %e, "Failed to send usage hint");
                }
            });
        }
    }

    StatusCode::OK
}

/// First http(s) URL in a message body.
pub fn extract_first_url(text: &str) -> Option<String> {
    let url_re = regex::Regex::new(r"https?://[^\s]+").expect("valid regex");
    url_re.find(text).map(|m| m.as_str().to_string())
}
