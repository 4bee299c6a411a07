//! Error types for the tracked-entity cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Error returned by cache store operations.
///
/// A cache miss is not an error: reads return `Ok(None)` for absent or expired
/// keys. Any `Err` means the operation did not take effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or exceeds the maximum length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Value could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected fault inside the store (e.g. a panicking update function)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true if retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::Internal(_))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Source Error Enum ==
/// Failure while reading the authoritative tracked-character list.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error reading tracked characters: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tracked character data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
}

// == Monitor Error Enum ==
/// Failure of a single reconciliation cycle.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("backing store: {0}")]
    Source(#[from] SourceError),

    #[error("cache: {0}")]
    Cache(#[from] CacheError),
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        match self {
            MonitorError::Cache(err) => err.into_response(),
            MonitorError::Source(err) => {
                let body = Json(json!({
                    "error": format!("backing store: {}", err)
                }));
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
        }
    }
}

// == Validation Error ==
/// Rejected construction of a domain value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field `{0}` is missing or empty")]
    EmptyField(&'static str),
    #[error("field `{field}` exceeds {max} bytes")]
    TooLong { field: &'static str, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_internal_is_transient() {
        assert!(CacheError::Internal("boom".into()).is_transient());
        assert!(!CacheError::InvalidKey("".into()).is_transient());
        assert!(!CacheError::Serialization("bad".into()).is_transient());
    }

    #[test]
    fn test_error_response_status() {
        let response = CacheError::InvalidKey("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = CacheError::Internal("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = MonitorError::Source(SourceError::Unavailable("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_monitor_error_wraps_source() {
        let err: MonitorError = SourceError::Unavailable("db down".into()).into();
        assert_eq!(err.to_string(), "backing store: Backing store unavailable: db down");
    }
}
