//! API Module
//!
//! Small HTTP surface for health checks and cache inspection.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics and monitor status
//! - `GET /cache/:key` - Inspect a cached value
//! - `DELETE /cache/:key` - Drop a cached value
//! - `POST /monitor/check` - Run a reconciliation cycle now

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
