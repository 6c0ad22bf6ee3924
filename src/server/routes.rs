//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check for container orchestration
        .route("/health", get(handlers::health))
        // Ticker lookup
        .route("/stocks/:symbol", get(handlers::stock_news))
        // Company lookup, one handler for every source
        .route(
            "/articles/:source_name/:company",
            get(handlers::company_news),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
