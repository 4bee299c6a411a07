//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and expiration.
///
/// Expiration uses tokio's clock so it follows a paused test runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds; `Some(0)` is treated as no TTL
    pub fn new(value: Value, ttl_seconds: Option<u64>) -> Self {
        let expires_at = ttl_seconds
            .filter(|ttl| *ttl > 0)
            .map(|ttl| Instant::now() + Duration::from_secs(ttl));

        Self { value, expires_at }
    }

    /// Creates an entry that expires at a fixed instant.
    pub fn with_expiry(value: Value, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new(json!("test_value"), None);

        assert_eq!(entry.value, json!("test_value"));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let entry = CacheEntry::new(json!(1), Some(0));
        assert!(entry.expires_at.is_none());
        assert!(entry.ttl_remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new(json!("test_value"), Some(1));

        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1001)).await;

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!("test_value"), Some(10));

        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(entry.ttl_remaining(), Some(Duration::from_secs(6)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::with_expiry(json!("test"), Some(now));

        // Entry should be expired when current time >= expires_at
        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
    }
}
