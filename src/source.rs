//! Backing Store
//!
//! The authoritative list of tracked characters that the cache is reconciled
//! against. The monitor only sees the [`TrackedCharacterSource`] trait.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::SourceError;
use crate::models::TrackedEntity;

/// Authoritative source of tracked characters.
#[async_trait]
pub trait TrackedCharacterSource: Send + Sync {
    /// Whether the backing store integration is configured at all.
    fn is_enabled(&self) -> bool;

    /// Reads every tracked character.
    async fn read_all_tracked_characters(&self) -> Result<Vec<TrackedEntity>, SourceError>;
}

// == Disabled Source ==
/// Stand-in used when no backing store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSource;

#[async_trait]
impl TrackedCharacterSource for DisabledSource {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn read_all_tracked_characters(&self) -> Result<Vec<TrackedEntity>, SourceError> {
        Err(SourceError::Unavailable("backing store disabled".to_string()))
    }
}

// == Memory Source ==
/// In-process backing store whose contents can be replaced at runtime.
#[derive(Debug, Default)]
pub struct MemorySource {
    characters: RwLock<Vec<TrackedEntity>>,
    failure: RwLock<Option<String>>,
}

impl MemorySource {
    pub fn new(characters: Vec<TrackedEntity>) -> Self {
        Self {
            characters: RwLock::new(characters),
            failure: RwLock::new(None),
        }
    }

    /// Replaces the authoritative list.
    pub async fn replace(&self, characters: Vec<TrackedEntity>) {
        *self.characters.write().await = characters;
    }

    /// Makes subsequent reads fail with `reason`, or succeed again with `None`.
    pub async fn set_failure(&self, reason: Option<String>) {
        *self.failure.write().await = reason;
    }
}

#[async_trait]
impl TrackedCharacterSource for MemorySource {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn read_all_tracked_characters(&self) -> Result<Vec<TrackedEntity>, SourceError> {
        if let Some(reason) = self.failure.read().await.clone() {
            return Err(SourceError::Unavailable(reason));
        }
        Ok(self.characters.read().await.clone())
    }
}

// == JSON File Source ==
/// Reads a JSON array of tracked characters from disk on every call.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TrackedCharacterSource for JsonFileSource {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn read_all_tracked_characters(&self) -> Result<Vec<TrackedEntity>, SourceError> {
        let raw = tokio::fs::read(&self.path).await?;
        let characters: Vec<TrackedEntity> = serde_json::from_slice(&raw)?;
        debug!(
            path = %self.path.display(),
            count = characters.len(),
            "Loaded tracked characters"
        );
        Ok(characters)
    }
}
