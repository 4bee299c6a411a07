//! API Routes
//!
//! Configures the Axum router for the health/stats surface.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    check_handler, delete_handler, get_handler, health_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Cache statistics and monitor status
/// - `GET /cache/:key` - Inspect a cached value
/// - `DELETE /cache/:key` - Drop a cached value
/// - `POST /monitor/check` - Run a reconciliation cycle now
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/monitor/check", post(check_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
