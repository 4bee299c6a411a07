//! API Handlers
//!
//! HTTP request handlers for the health/stats surface.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::cache::Cache;
use crate::error::{MonitorError, Result};
use crate::models::{CheckResponse, DeleteResponse, GetResponse, HealthResponse, StatsResponse};
use crate::tasks::CacheMonitor;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache handle
    pub cache: Cache,
    /// Reconciliation monitor
    pub monitor: Arc<CacheMonitor>,
}

impl AppState {
    pub fn new(cache: Cache, monitor: Arc<CacheMonitor>) -> Self {
        Self { cache, monitor }
    }
}

/// Handler for GET /cache/:key
///
/// Returns the live value of a key, or 404 when it is absent or expired.
/// Tracked-list keys read as an empty list.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let Some(value) = state.cache.get(&key).await? else {
        let body = Json(json!({ "error": format!("Key not found: {}", key) }));
        return Ok((StatusCode::NOT_FOUND, body).into_response());
    };

    let ttl = state
        .cache
        .store()
        .entry(&key)
        .and_then(|entry| entry.ttl_remaining());

    Ok(Json(GetResponse::new(key, value, ttl)).into_response())
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns cache counters and the monitor's running status.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let monitor = state.monitor.status().await;
    Json(StatsResponse::new(state.cache.stats(), monitor))
}

/// Handler for POST /monitor/check
///
/// Runs a reconciliation cycle immediately, outside the regular schedule.
pub async fn check_handler(
    State(state): State<AppState>,
) -> std::result::Result<Json<CheckResponse>, MonitorError> {
    let outcome = state.monitor.check_now().await?;
    Ok(Json(CheckResponse { outcome }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
