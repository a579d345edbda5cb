//! WrldBldr Conflict - HTTP server for the tactical conflict engine
//!
//! The server:
//! - Keeps live conflicts in memory, one per variant per location
//! - Exposes every conflict command as a REST route
//! - Rolls dice locally in place of an external dice service

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wrldbldr_conflict::infrastructure::config::AppConfig;
use wrldbldr_conflict::infrastructure::http;
use wrldbldr_conflict::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wrldbldr_conflict=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WrldBldr Conflict");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Reveal policy: {:?}", config.reveal_policy);
    tracing::info!("  Warfare commanders: {}", config.warfare_commanders.len());
    if let Some(path) = &config.asset_catalog_path {
        tracing::info!("  Asset catalog: {}", path.display());
    }
    let port = config.server_port;

    // Initialize application state
    let state = AppState::new(config).await?;
    let restored = state.restore().await?;
    let state = Arc::new(state);
    tracing::info!(restored, "Application state initialized");

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
