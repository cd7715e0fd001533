//! Store Probe - a diagnostic web service for Postgres and Redis

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use store_probe::db::{ItemStore, PgItemStore};
use store_probe::kv::RedisBackend;
use store_probe::{create_router, AppState, Config};

/// Main entry point for the probe server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the Postgres pool and Redis client (neither connects yet)
/// 4. Bootstrap the items table, tolerating an unreachable database
/// 5. Create Axum router with all endpoints
/// 6. Serve until SIGINT/SIGTERM, then close the pool
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "store_probe=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Store Probe");

    let config = Config::from_env();
    info!(
        "Configuration loaded: postgres={}:{}/{}, pool={}, port={}",
        config.postgres_host,
        config.postgres_port,
        config.postgres_db,
        config.pg_max_connections,
        config.server_port
    );

    let items = Arc::new(PgItemStore::from_config(&config));
    let kv = Arc::new(RedisBackend::new(&config.redis_url).context("invalid REDIS_URL")?);

    // Create requests retry the bootstrap if the database is down right now
    match items.bootstrap().await {
        Ok(()) => info!("Schema bootstrap complete"),
        Err(e) => warn!("Schema bootstrap deferred: {}", e),
    }

    let app = create_router(AppState::new(items.clone(), kv));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    items.pool().close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
}
