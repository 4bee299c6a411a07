//! Notifier Cache - tracked-entity cache for a killmail notifier
//!
//! Keeps tracked characters and systems in memory with TTL expiration,
//! sweeps expired entries, and reconciles the cache against the
//! authoritative backing store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheStore};
pub use config::Config;
pub use tasks::{spawn_monitor_task, spawn_sweep_task, CacheMonitor};
