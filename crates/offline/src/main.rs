//! LiteShop Offline Gateway - cache-backed proxy for the storefront.
//!
//! This binary fronts the storefront on port 3001.
//!
//! # Architecture
//!
//! - Axum server proxying to the storefront origin
//! - Service-worker style lifecycle: install precaches the manifest into a
//!   versioned cache generation, activate prunes every other generation
//! - Documents are served network-first with the cache as offline fallback,
//!   other GETs cache-first, and non-GET traffic bypasses the cache
//!
//! A failed install exits nonzero without writing anything, so an already
//! deployed cache generation stays in control.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

mod config;
mod gateway;
mod manifest;
mod store;
mod worker;

use config::OfflineConfig;
use gateway::GatewayState;
use manifest::CacheManifest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worker::Worker;

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = OfflineConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "liteshop_offline=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let manifest = CacheManifest::resolve(&config).expect("Failed to load cache manifest");
    tracing::info!(
        version = %manifest.version,
        assets = manifest.assets.len(),
        "Cache manifest loaded"
    );

    let worker = Worker::new(config.clone(), manifest).expect("Failed to build worker");

    // Install, then take control immediately; a single-worker deployment has
    // no waiting instance to hand over to
    worker.install().await.expect("Install failed");
    worker.activate().await.expect("Activate failed");

    // Build router
    let state = GatewayState::new(Arc::new(worker));
    let app = gateway::router(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("offline gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
