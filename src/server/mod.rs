//! HTTP server
//!
//! Exposes the planning pipeline over REST: plan generation, interaction
//! acknowledgement, and a health probe.

pub mod routes;
pub mod state;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use state::AppState;

/// Start the HTTP server and serve until shutdown.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config)?);

    let mut app = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/ai/generate-plan", post(routes::plan::generate_plan))
        .route(
            "/api/ai/execute-interaction",
            post(routes::plan::execute_interaction),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    tracing::info!("Starting cardflow server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
