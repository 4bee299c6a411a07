//! Response DTOs for the health/stats HTTP surface
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::cache::{keys, CacheStats};
use crate::tasks::{CheckOutcome, MonitorStatus};

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// Log grouping pattern of the key
    pub pattern: String,
    /// The stored value
    pub value: Value,
    /// Remaining TTL in seconds, absent for entries that never expire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_remaining: Option<u64>,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value, ttl_remaining: Option<Duration>) -> Self {
        let key = key.into();
        Self {
            pattern: keys::pattern(&key),
            key,
            value,
            ttl_remaining: ttl_remaining.map(|ttl| ttl.as_secs()),
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted", key),
            key,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Cache counters
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Reconciliation monitor status
    pub monitor: MonitorStatus,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, monitor: MonitorStatus) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            monitor,
        }
    }
}

/// Response body for `POST /monitor/check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub outcome: CheckOutcome,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
