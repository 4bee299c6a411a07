//! Cache Module
//!
//! Provides the in-memory tracked-entity cache with TTL expiration,
//! the key scheme shared by all consumers, and bounded retry.

mod entry;
pub mod keys;
mod repository;
mod retry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use repository::Cache;
pub use retry::{with_retry, RetryPolicy};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
