//! Cache Store Module
//!
//! Main cache engine: a concurrent key/value map with per-entry TTL,
//! read-time expiration and per-key serialised read-modify-write.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::cache::stats::StatsCounters;
use crate::cache::{keys, CacheEntry, CacheStats, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Process-wide cache storage with TTL support.
///
/// Shared as `Arc<CacheStore>` and injected into every collaborator.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: DashMap<String, CacheEntry>,
    /// One mutex per key with a `get_and_update` in flight
    update_locks: DashMap<String, Arc<Mutex<()>>>,
    /// Performance statistics
    stats: StatsCounters,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` for keys that were never set, were deleted, or whose
    /// TTL has elapsed, whether or not the sweep has run. Expired entries are
    /// removed on read. The tracked-list keys read as an empty array when absent.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        let now = Instant::now();

        let mut expired = false;
        let found = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => Some(entry.value.clone()),
            Some(_) => {
                expired = true;
                None
            }
            None => None,
        };

        if expired && self.entries.remove_if(key, |_, e| e.is_expired_at(now)).is_some() {
            self.stats.record_expirations(1);
            debug!(pattern = %keys::pattern(key), "Removed expired entry on read");
        }

        match found {
            Some(value) => {
                self.stats.record_hit();
                Ok(Some(value))
            }
            None => {
                self.stats.record_miss();
                if keys::is_collection(key) {
                    Ok(Some(Value::Array(Vec::new())))
                } else {
                    Ok(None)
                }
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL in seconds; `None` or `Some(0)` never expires
    pub fn set(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<()> {
        validate_key(key)?;

        let entry = CacheEntry::new(value, ttl);
        self.entries.insert(key.to_string(), entry);

        debug!(pattern = %keys::pattern(key), ttl = ?ttl, "Cache set");
        Ok(())
    }

    /// Snapshot of a live entry, including its expiry. Does not touch stats.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value().clone())
    }

    // == Put ==
    /// Stores a value that never expires.
    pub fn put(&self, key: &str, value: Value) -> Result<()> {
        self.set(key, value, None)
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        if self.entries.remove(key).is_some() {
            debug!(pattern = %keys::pattern(key), "Cache delete");
        }
        Ok(())
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        let count = self.entries.len();
        self.entries.clear();
        info!("Cache cleared ({} entries)", count);
        Ok(())
    }

    // == Get And Update ==
    /// Atomically reads, transforms and writes a single key.
    ///
    /// `update` receives the current value (`None` if absent or expired) and
    /// returns the value to store plus the result to hand back. The stored
    /// entry keeps its previous expiration instant, if any.
    ///
    /// Concurrent calls on the same key are serialised; calls on different
    /// keys use different locks. A panic inside `update` leaves the entry
    /// untouched and is reported as `CacheError::Internal`.
    pub async fn get_and_update<F, R>(&self, key: &str, update: F) -> Result<R>
    where
        F: FnOnce(Option<Value>) -> (Value, R),
    {
        validate_key(key)?;

        let lock = Arc::clone(&self.update_locks.entry(key.to_string()).or_default());
        let result = {
            let _guard = lock.lock().await;
            let now = Instant::now();

            let (current, expires_at) = match self
                .entries
                .get(key)
                .filter(|e| !e.is_expired_at(now))
                .map(|e| (e.value.clone(), e.expires_at))
            {
                Some((value, expires_at)) => (Some(value), expires_at),
                None => (None, None),
            };

            match panic::catch_unwind(AssertUnwindSafe(move || update(current))) {
                Ok((new_value, result)) => {
                    self.entries
                        .insert(key.to_string(), CacheEntry::with_expiry(new_value, expires_at));
                    Ok(result)
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(pattern = %keys::pattern(key), "Update function panicked: {}", reason);
                    Err(CacheError::Internal(format!("update of '{}' panicked: {}", key, reason)))
                }
            }
        };

        drop(lock);
        self.update_locks
            .remove_if(key, |_, l| Arc::strong_count(l) == 1);

        result
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });

        self.stats.record_expirations(removed as u64);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a prepared entry as-is, e.g. one that is already expired.
    #[cfg(test)]
    pub(crate) fn insert_entry(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
