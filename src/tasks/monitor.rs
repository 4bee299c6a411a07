//! Cache Monitor
//!
//! Periodically compares the cached tracked-character list with the
//! authoritative backing store and rebuilds the cache when they drift apart.
//! The backing store always wins; any drift triggers a full resync of the
//! character entries rather than a field-level patch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::Cache;
use crate::error::MonitorError;
use crate::models::{EntityKind, TrackedEntity};
use crate::source::TrackedCharacterSource;

// == Settings ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Time between checks
    pub interval: Duration,
    /// Warm-up delay before the first check
    pub initial_delay: Duration,
    /// TTL in seconds applied to every entry written by a resync
    pub character_ttl: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
            initial_delay: Duration::from_secs(5 * 60),
            character_ttl: 86_400,
        }
    }
}

// == Report ==
/// Result of comparing the cache with the backing store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub cached_count: usize,
    pub backing_count: usize,
    pub count_mismatch: bool,
    /// Ids in the backing store but not in the cache
    pub missing: Vec<String>,
    /// Ids whose cached name differs from the backing store
    pub different: Vec<String>,
    /// Ids in the cache but no longer in the backing store
    pub stale: Vec<String>,
    pub fixed_issues: usize,
    pub resynced: bool,
    pub checked_at: DateTime<Utc>,
}

impl ReconcileReport {
    pub fn has_drift(&self) -> bool {
        self.count_mismatch || !self.missing.is_empty() || !self.different.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Backing store integration disabled; nothing compared
    Skipped { cached_count: usize },
    Checked(ReconcileReport),
}

/// Running totals kept by the monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub checks_run: u64,
    pub failures: u64,
    pub total_fixed: u64,
    pub last_outcome: Option<CheckOutcome>,
    pub last_error: Option<String>,
}

/// Compares cached and authoritative lists by stringified id.
pub fn compare(cached: &[TrackedEntity], backing: &[TrackedEntity]) -> ReconcileReport {
    let cached_by_id: HashMap<&str, &TrackedEntity> =
        cached.iter().map(|c| (c.id.as_str(), c)).collect();
    let backing_by_id: HashMap<&str, &TrackedEntity> =
        backing.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut missing = Vec::new();
    let mut different = Vec::new();
    for entity in backing {
        match cached_by_id.get(entity.id.as_str()) {
            None => missing.push(entity.id.clone()),
            Some(cached) if cached.name != entity.name => different.push(entity.id.clone()),
            Some(_) => {}
        }
    }

    let stale = cached
        .iter()
        .filter(|c| !backing_by_id.contains_key(c.id.as_str()))
        .map(|c| c.id.clone())
        .collect();

    let count_mismatch = cached.len() != backing.len();
    let fixed_issues = missing.len() + different.len() + usize::from(count_mismatch);

    ReconcileReport {
        cached_count: cached.len(),
        backing_count: backing.len(),
        count_mismatch,
        missing,
        different,
        stale,
        fixed_issues,
        resynced: false,
        checked_at: Utc::now(),
    }
}

// == Cache Monitor ==
pub struct CacheMonitor {
    cache: Cache,
    source: Arc<dyn TrackedCharacterSource>,
    settings: MonitorSettings,
    status: RwLock<MonitorStatus>,
}

impl CacheMonitor {
    pub fn new(
        cache: Cache,
        source: Arc<dyn TrackedCharacterSource>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            cache,
            source,
            settings,
            status: RwLock::new(MonitorStatus::default()),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub async fn status(&self) -> MonitorStatus {
        self.status.read().await.clone()
    }

    /// Runs one check and records its outcome in the monitor status.
    pub async fn check_now(&self) -> Result<CheckOutcome, MonitorError> {
        let result = self.check_once().await;

        let mut status = self.status.write().await;
        status.checks_run += 1;
        match &result {
            Ok(outcome) => {
                if let CheckOutcome::Checked(report) = outcome {
                    if report.resynced {
                        status.total_fixed += report.fixed_issues as u64;
                    }
                }
                status.last_outcome = Some(outcome.clone());
                status.last_error = None;
            }
            Err(err) => {
                status.failures += 1;
                status.last_error = Some(err.to_string());
            }
        }

        result
    }

    /// Compares the cache with the backing store and resyncs on drift.
    ///
    /// Nothing is written when the two sides already agree.
    pub async fn check_once(&self) -> Result<CheckOutcome, MonitorError> {
        let cached = self.cache.try_tracked_entities(EntityKind::Character).await?;

        if !self.source.is_enabled() {
            info!(
                cached = cached.len(),
                "Backing store disabled, skipping tracked character check"
            );
            return Ok(CheckOutcome::Skipped {
                cached_count: cached.len(),
            });
        }

        let backing = self.source.read_all_tracked_characters().await?;
        let mut report = compare(&cached, &backing);

        if report.has_drift() {
            warn!(
                cached = report.cached_count,
                backing = report.backing_count,
                missing = report.missing.len(),
                different = report.different.len(),
                "Tracked character cache drift detected, resyncing"
            );
            self.resync(&backing, &report.stale).await?;
            report.resynced = true;
            info!(
                fixed = report.fixed_issues,
                removed = report.stale.len(),
                "Tracked character cache resynced"
            );
        } else {
            debug!(count = report.cached_count, "Tracked character cache consistent");
        }

        Ok(CheckOutcome::Checked(report))
    }

    /// Rewrites the character entries from `backing`. The tracked list is
    /// the last write, so a resync that fails part way still shows drift on
    /// the next check.
    async fn resync(&self, backing: &[TrackedEntity], stale: &[String]) -> Result<(), MonitorError> {
        for id in stale {
            self.cache
                .remove_tracked_entity(EntityKind::Character, id)
                .await?;
        }

        let ttl = Some(self.settings.character_ttl);
        self.cache
            .cache_tracked_entities(EntityKind::Character, backing, ttl)
            .await?;
        Ok(())
    }
}

/// Spawns the reconciliation loop.
///
/// Waits `initial_delay`, then checks every `interval`. A failed check is
/// logged and the next one is still scheduled.
pub fn spawn_monitor_task(monitor: Arc<CacheMonitor>) -> JoinHandle<()> {
    let MonitorSettings {
        interval,
        initial_delay,
        ..
    } = *monitor.settings();

    tokio::spawn(async move {
        info!(
            "Starting cache monitor: first check in {:?}, then every {:?}",
            initial_delay, interval
        );
        tokio::time::sleep(initial_delay).await;

        loop {
            match monitor.check_now().await {
                Ok(CheckOutcome::Checked(report)) => info!(
                    cached = report.cached_count,
                    backing = report.backing_count,
                    fixed = report.fixed_issues,
                    resynced = report.resynced,
                    "Cache check complete"
                ),
                Ok(CheckOutcome::Skipped { .. }) => {}
                Err(err) => error!("Cache check failed: {}", err),
            }

            tokio::time::sleep(interval).await;
        }
    })
}
