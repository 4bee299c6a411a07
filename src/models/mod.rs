//! Domain and response models
//!
//! `tracked` holds the tracked-entity domain type; `responses` holds the
//! DTOs serialised by the health/stats HTTP surface.

pub mod responses;
pub mod tracked;

// Re-export commonly used types
pub use responses::{CheckResponse, DeleteResponse, GetResponse, HealthResponse, StatsResponse};
pub use tracked::{EntityKind, TrackedEntity, MAX_ID_LENGTH};
