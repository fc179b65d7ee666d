//! HTTP trigger for batch runs.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::PipelineConfig;

pub fn build_router(config: PipelineConfig) -> Router {
    let state = Arc::new(AppState::new(config));

    Router::new()
        .route("/api/scrape", get(handlers::scrape_status).post(handlers::run_scrape))
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, config: PipelineConfig) -> std::io::Result<()> {
    let app = build_router(config);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "foreclosure atlas server listening");
    axum::serve(listener, app).await
}
