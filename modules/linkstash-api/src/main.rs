use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkstash_common::Config;
use linkstash_core::notify::Notifier;
use linkstash_core::store::{migrate, ItemStore, PgStore};
use linkstash_core::{Enricher, Processor};
use whatsapp::WhatsAppClient;

mod keepalive;
mod rest;
mod webhook;

pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub processor: Arc<Processor>,
    pub notifier: Arc<dyn Notifier>,
    pub verify_token: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("linkstash=info".parse()?))
        .init();

    info!("LinkStash API starting...");

    let config = Config::from_env();
    config.log_redacted();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    migrate(&pool).await?;

    let store: Arc<dyn ItemStore> = Arc::new(PgStore::new(pool));
    let notifier: Arc<dyn Notifier> = Arc::new(WhatsAppClient::new(
        &config.whatsapp_access_token,
        &config.whatsapp_phone_number_id,
    ));
    let enricher = Enricher::from_config(&config);
    let processor = Arc::new(Processor::new(
        store.clone(),
        enricher,
        notifier.clone(),
    ));

    keepalive::spawn(config.keepalive_url.clone());

    let state = Arc::new(AppState {
        store,
        processor,
        notifier,
        verify_token: config.whatsapp_verify_token.clone(),
    });

    let app = Router::new()
        .route("/", get(rest::health))
        .route("/health", get(rest::health))
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        .route("/api/items", get(rest::list_items))
        .route("/api/items/{id}", delete(rest::delete_item))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.host, config.port);
    info!("LinkStash API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
