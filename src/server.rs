//! HTTP server initialization and runtime setup.
//!
//! Handles store connections, state wiring and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::repositories::Keyspaces;
use crate::infrastructure::store::{MemoryStore, RedisStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Links and quotas keyspaces (Redis, or in-memory without Redis)
/// - Services and shared state
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Redis is configured but unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let keyspaces = connect_keyspaces(&config).await?;

    let state = AppState::new(keyspaces, &config);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Opens both keyspaces described by `config`.
///
/// With Redis configured each keyspace gets its own logical database and a
/// failed connection aborts startup. Without Redis both keyspaces are
/// process-local maps.
///
/// # Errors
///
/// Returns an error if the Redis URL is invalid or a connection fails.
pub async fn connect_keyspaces(config: &Config) -> Result<Keyspaces> {
    let links_url = config.redis_url_for(config.links_db)?;
    let quota_url = config.redis_url_for(config.quota_db)?;

    match (links_url, quota_url) {
        (Some(links_url), Some(quota_url)) => {
            let links = RedisStore::connect(&links_url, "links")
                .await
                .context("Failed to connect links keyspace")?;
            let quotas = RedisStore::connect(&quota_url, "quotas")
                .await
                .context("Failed to connect quotas keyspace")?;

            Ok(Keyspaces::new(Arc::new(links), Arc::new(quotas)))
        }
        _ => {
            tracing::warn!("Redis not configured, using in-memory store (data is lost on restart)");
            Ok(Keyspaces::new(
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryStore::new()),
            ))
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
