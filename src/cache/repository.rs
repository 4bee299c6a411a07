//! Cache Repository
//!
//! The handle every cache consumer holds: store operations wrapped in the
//! retry policy, plus typed helpers for tracked characters and systems.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::keys::{self, KeyPart};
use crate::cache::retry::{with_retry, RetryPolicy};
use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;
use crate::models::{EntityKind, TrackedEntity};

// == Cache ==
/// Cheap-to-clone handle over the shared store.
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<CacheStore>,
    policy: RetryPolicy,
}

impl Cache {
    pub fn new(store: Arc<CacheStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// The underlying store, e.g. for the sweep task.
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    // == Retried Store Operations ==
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let store = &self.store;
        with_retry(self.policy, "get", key, move || async move { store.get(key) }).await
    }

    pub async fn set(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<()> {
        let store = &self.store;
        with_retry(self.policy, "set", key, move || {
            let value = value.clone();
            async move { store.set(key, value, ttl) }
        })
        .await
    }

    pub async fn put(&self, key: &str, value: Value) -> Result<()> {
        let store = &self.store;
        with_retry(self.policy, "put", key, move || {
            let value = value.clone();
            async move { store.put(key, value) }
        })
        .await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let store = &self.store;
        with_retry(self.policy, "delete", key, move || async move { store.delete(key) }).await
    }

    pub async fn clear(&self) -> Result<()> {
        let store = &self.store;
        with_retry(self.policy, "clear", "*", move || async move { store.clear() }).await
    }

    /// Retried [`CacheStore::get_and_update`]. `update` is cloned per attempt.
    pub async fn get_and_update<F, R>(&self, key: &str, update: F) -> Result<R>
    where
        F: FnOnce(Option<Value>) -> (Value, R) + Clone,
    {
        let store = &self.store;
        with_retry(self.policy, "get_and_update", key, move || {
            let update = update.clone();
            async move { store.get_and_update(key, update).await }
        })
        .await
    }

    // == Typed Access ==
    /// Reads and deserialises a value. A value of the wrong shape is logged
    /// and reported as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(err) => {
                warn!(pattern = %keys::pattern(key), "Malformed cached value treated as missing: {}", err);
                Ok(None)
            }
        }
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T, ttl: Option<u64>) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value, ttl).await
    }

    pub async fn put_as<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_as(key, value, None).await
    }

    // == Tracked Entities ==
    /// Cached tracked list of a kind. Malformed data reads as empty; store
    /// errors are returned.
    pub async fn try_tracked_entities(&self, kind: EntityKind) -> Result<Vec<TrackedEntity>> {
        Ok(self
            .get_as::<Vec<TrackedEntity>>(&keys::tracked_list(kind))
            .await?
            .unwrap_or_default())
    }

    /// Cached tracked list of a kind, empty on miss or error.
    pub async fn tracked_entities(&self, kind: EntityKind) -> Vec<TrackedEntity> {
        match self.try_tracked_entities(kind).await {
            Ok(entities) => entities,
            Err(err) => {
                warn!(kind = kind.as_str(), "Tracked list unavailable, using empty: {}", err);
                Vec::new()
            }
        }
    }

    pub async fn tracked_characters(&self) -> Vec<TrackedEntity> {
        self.tracked_entities(EntityKind::Character).await
    }

    pub async fn tracked_systems(&self) -> Vec<TrackedEntity> {
        self.tracked_entities(EntityKind::System).await
    }

    /// Tracked flag of one entity, `false` on miss or error.
    pub async fn is_tracked(&self, kind: EntityKind, id: impl Into<KeyPart>) -> bool {
        let key = keys::tracked_flag(kind, id);
        match self.get_as::<bool>(&key).await {
            Ok(flag) => flag.unwrap_or(false),
            Err(err) => {
                warn!(pattern = %keys::pattern(&key), "Tracked flag unavailable: {}", err);
                false
            }
        }
    }

    pub async fn is_character_tracked(&self, id: impl Into<KeyPart>) -> bool {
        self.is_tracked(EntityKind::Character, id).await
    }

    pub async fn is_system_tracked(&self, id: impl Into<KeyPart>) -> bool {
        self.is_tracked(EntityKind::System, id).await
    }

    /// Cached data entry of one entity.
    pub async fn tracked_entity(
        &self,
        kind: EntityKind,
        id: impl Into<KeyPart>,
    ) -> Result<Option<TrackedEntity>> {
        self.get_as(&keys::entity(kind, id)).await
    }

    /// Writes every entity's data entry and tracked flag, then the tracked list.
    ///
    /// Not atomic across keys; stops at the first failed write. The list is
    /// written last so an interrupted call leaves it out of date rather than
    /// pointing at entries that were never written.
    pub async fn cache_tracked_entities(
        &self,
        kind: EntityKind,
        entities: &[TrackedEntity],
        ttl: Option<u64>,
    ) -> Result<()> {
        for entity in entities {
            self.set_as(&keys::entity(kind, &entity.id), entity, ttl).await?;
            self.set(&keys::tracked_flag(kind, &entity.id), Value::Bool(entity.tracked), ttl)
                .await?;
        }

        self.set_as(&keys::tracked_list(kind), &entities, ttl).await?;

        debug!(kind = kind.as_str(), count = entities.len(), "Cached tracked entities");
        Ok(())
    }

    /// Drops the data entry and tracked flag of one entity.
    pub async fn remove_tracked_entity(&self, kind: EntityKind, id: &str) -> Result<()> {
        self.delete(&keys::entity(kind, id)).await?;
        self.delete(&keys::tracked_flag(kind, id)).await
    }
}
