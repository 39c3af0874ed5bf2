// Bookline API server

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookline_api::clients::AppState;
use bookline_api::config::ApiConfig;
use bookline_api::directory::DirectoryClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("bookline-api starting...");

    let config = ApiConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        directory_url = %config.directory_url,
        business_id = %config.business_id,
        "Client directory configured"
    );

    let directory = Arc::new(DirectoryClient::new(
        &config.directory_url,
        &config.business_id,
        &config.api_key,
    ));

    let mut app = bookline_api::app(AppState { directory }).layer(TraceLayer::new_for_http());

    // Only needed when the UI is served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = cors_origins.len(), "CORS configured");
        app = app.layer(
            CorsLayer::new()
                .allow_origin(cors_origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
