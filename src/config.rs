//! Configuration Module
//!
//! Loads service settings once at startup. Components receive plain values
//! from here and never read the environment themselves.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::RetryPolicy;
use crate::tasks::MonitorSettings;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port for the health/stats surface
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds
    pub sweep_interval: u64,
    /// Reconciliation interval in seconds
    pub reconcile_interval: u64,
    /// Delay before the first reconciliation in seconds
    pub reconcile_initial_delay: u64,
    /// TTL in seconds for cached character entries
    pub character_ttl: u64,
    /// Retries after the first failed attempt of a cache operation
    pub max_retries: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
    /// JSON file holding the authoritative tracked characters; unset disables reconciliation
    pub tracked_characters_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `RECONCILE_INTERVAL` - Reconciliation frequency in seconds (default: 900)
    /// - `RECONCILE_INITIAL_DELAY` - Warm-up delay in seconds (default: 300)
    /// - `CHARACTER_TTL` - Character entry TTL in seconds (default: 86400)
    /// - `CACHE_MAX_RETRIES` - Retry count for cache operations (default: 3)
    /// - `CACHE_RETRY_DELAY_MS` - Delay between retries (default: 100)
    /// - `TRACKED_CHARACTERS_FILE` - Backing store file (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            reconcile_interval: env_or("RECONCILE_INTERVAL", defaults.reconcile_interval),
            reconcile_initial_delay: env_or(
                "RECONCILE_INITIAL_DELAY",
                defaults.reconcile_initial_delay,
            ),
            character_ttl: env_or("CHARACTER_TTL", defaults.character_ttl),
            max_retries: env_or("CACHE_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("CACHE_RETRY_DELAY_MS", defaults.retry_delay_ms),
            tracked_characters_file: env::var("TRACKED_CHARACTERS_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    /// Retry policy applied to every cache operation.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    /// Timing and TTL settings for the reconciliation monitor.
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_secs(self.reconcile_interval),
            initial_delay: Duration::from_secs(self.reconcile_initial_delay),
            character_ttl: self.character_ttl,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: 300,
            reconcile_interval: 900,
            reconcile_initial_delay: 300,
            character_ttl: 86_400,
            max_retries: 3,
            retry_delay_ms: 100,
            tracked_characters_file: None,
        }
    }
}
