//! FwitIt HTTP Server
//!
//! Axum-based backend for the FwitIt app. Pulls signals from the market
//! data service (or the demo deck when none is configured), classifies them
//! and forwards user-confirmed trades.

mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fwitit_core::{MarketClients, MarketConfig};

use crate::handlers::{current_state, execute_trade, get_account, get_position, health_check, refresh_recommendation};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/recommendation", get(refresh_recommendation))
        .route("/api/recommendation/state", get(current_state))
        .route("/api/trade/execute", post(execute_trade))
        .route("/api/trade/positions/{symbol}", get(get_position))
        .route("/api/trade/account", get(get_account))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MarketConfig::from_env()?;
    let clients = MarketClients::from_config(&config)?;

    if clients.data.health_check().await {
        tracing::info!("✓ Market service {} reachable", clients.data.name());
    } else {
        tracing::warn!("⚠ Market service {} not reachable", clients.data.name());
        tracing::warn!("  Fallback policy: {:?}", config.fallback);
    }

    let app = router(AppState::new(clients, config.fallback));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("fwitit server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                   - Health check");
    tracing::info!("  GET  /api/recommendation       - Fetch and classify");
    tracing::info!("  GET  /api/recommendation/state - Current provider state");
    tracing::info!("  POST /api/trade/execute        - Submit confirmed order");
    tracing::info!("  GET  /api/trade/positions/{{symbol}} - Open position");
    tracing::info!("  GET  /api/trade/account        - Account summary");

    axum::serve(listener, app).await?;

    Ok(())
}
