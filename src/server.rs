//! HTTP server initialization and runtime setup.
//!
//! Handles rate store selection, the sweeper task, and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::repositories::RateStore;
use crate::infrastructure::rate_store::{MemoryRateStore, RedisRateStore, spawn_sweeper};
use crate::infrastructure::session::SignedCookieSessions;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis rate store (or in-memory fallback)
/// - Background sweeper for expired rate records
/// - Signed-cookie session provider
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Listen address is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let rate_store = build_rate_store(&config).await;

    let sweeper = spawn_sweeper(
        rate_store.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    );

    let sessions = Arc::new(SignedCookieSessions::new(config.session_secret.clone()));
    let state = AppState::new(&config, rate_store, sessions);

    let app = app_router(state, &config.static_dir);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.stop().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn build_rate_store(config: &Config) -> Arc<dyn RateStore> {
    if let Some(redis_url) = &config.redis_url {
        match RedisRateStore::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Rate store: Redis");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using in-memory rate store.", e);
            }
        }
    } else {
        tracing::info!("Rate store: in-memory");
    }

    Arc::new(MemoryRateStore::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
