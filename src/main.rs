use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use tokenforge_backend::api::{create_api_router, ApiState};
use tokenforge_backend::config::Config;
use tokenforge_backend::networks::SUPPORTED_NETWORKS;
use tokenforge_backend::persist::LogSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    info!(
        "✅ Network registry loaded: {} chains ({})",
        SUPPORTED_NETWORKS.len(),
        SUPPORTED_NETWORKS
            .iter()
            .map(|n| n.name)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let state = ApiState {
        config: Arc::new(config.clone()),
        sink: Arc::new(LogSink),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", create_api_router())
        .with_state(state)
        .layer(CorsLayer::permissive());

    info!("🔧 Routes configured:");
    info!("  - POST /api/deploy (token deployment)");
    info!("  - GET  /api/tokens (user token listing)");
    info!("  - GET  /api/networks (supported chains)");
    info!("  - GET  /health");
    info!("🚀 Starting server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
