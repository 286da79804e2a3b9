use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;
use uuid::Uuid;

use crate::AppState;

pub async fn health() -> &'static str {
    "ok"
}

/// All saved items, newest first.
pub async fn list_items(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to list items");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to list items"})),
            )
                .into_response()
        }
    }
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No such item"})),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, %id, "Failed to delete item");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to delete item"})),
            )
                .into_response()
        }
    }
}
