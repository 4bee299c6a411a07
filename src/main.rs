//! Notifier Cache - tracked-entity cache service
//!
//! Runs the cache sweep and reconciliation monitor alongside a small
//! health/stats HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notifier_cache::api::{create_router, AppState};
use notifier_cache::source::{DisabledSource, JsonFileSource, TrackedCharacterSource};
use notifier_cache::{spawn_monitor_task, spawn_sweep_task, Cache, CacheMonitor, CacheStore, Config};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache store
/// 4. Start the sweep and monitor tasks
/// 5. Serve the health/stats router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notifier_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting notifier cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: sweep_interval={}s, reconcile_interval={}s, initial_delay={}s, character_ttl={}s, max_retries={}, port={}",
        config.sweep_interval,
        config.reconcile_interval,
        config.reconcile_initial_delay,
        config.character_ttl,
        config.max_retries,
        config.server_port
    );

    let store = Arc::new(CacheStore::new());
    let cache = Cache::new(store.clone(), config.retry_policy());

    let source: Arc<dyn TrackedCharacterSource> = match &config.tracked_characters_file {
        Some(path) => {
            info!("Backing store: {}", path.display());
            Arc::new(JsonFileSource::new(path.clone()))
        }
        None => {
            warn!("TRACKED_CHARACTERS_FILE not set, reconciliation disabled");
            Arc::new(DisabledSource)
        }
    };
    let monitor = Arc::new(CacheMonitor::new(
        cache.clone(),
        source,
        config.monitor_settings(),
    ));

    let handles = vec![
        spawn_sweep_task(store, config.sweep_interval()),
        spawn_monitor_task(monitor.clone()),
    ];
    info!("Background tasks started");

    let app = create_router(AppState::new(cache, monitor));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(handles))
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts background tasks.
async fn shutdown_signal(handles: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in handles {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
