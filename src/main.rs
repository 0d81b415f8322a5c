//! Fleet Cache - admin server for the fleet ERP caching layer
//!
//! Serves the cache admin API while the sweeper and live invalidation
//! listeners run in the background.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleet_cache::api::create_router;
use fleet_cache::{spawn_listener_task, spawn_sweeper_task, AppState, Config, LiveInvalidation};

/// Main entry point for the Fleet Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create cache service, remote store and listeners
/// 4. Start background sweeper and listener initialization
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fleet Cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}ms, prefix={}, port={}, sweep_interval={}s",
        config.default_ttl_ms, config.cache_prefix, config.server_port, config.sweep_interval
    );

    let state = AppState::from_config(&config).context("failed to initialize cache storage")?;
    info!("Cache service initialized");

    let sweeper_handle = spawn_sweeper_task(
        state.cache.clone(),
        Duration::from_secs(config.sweep_interval),
    );
    info!("Background sweeper started");

    // Attaching waits on remote readiness, so it runs off the startup path
    let _listener_init = spawn_listener_task(state.listeners.clone());
    let listeners = state.listeners.clone();

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper_handle, listeners))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown, aborts the sweeper and detaches every live listener.
async fn shutdown_signal(sweeper_handle: JoinHandle<()>, listeners: std::sync::Arc<LiveInvalidation>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    sweeper_handle.abort();
    info!("Sweeper task aborted");

    let stopped = listeners.stop_all().await;
    info!(stopped, "Live invalidation listeners detached");
}
