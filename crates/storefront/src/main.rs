//! LiteShop Storefront - server-rendered shop demo.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - In-memory catalog loaded once from a JSON file at startup
//! - File-backed key-value store for cart persistence across restarts
//!
//! All derived numbers on the page (badge count, subtotal, per-card
//! quantities) are recomputed from the stored line items on every render;
//! nothing is patched incrementally.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

mod analytics;
mod catalog;
mod config;
mod error;
mod filters;
mod routes;
mod state;
mod store;

use analytics::{LogSink, Tracker};
use config::StorefrontConfig;
use state::AppState;
use store::{CartStore, KvStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "liteshop_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load the catalog once; it is immutable for the life of the process
    let catalog = catalog::load(&config.catalog_path).expect("Failed to load catalog");
    tracing::info!(products = catalog.len(), "Catalog loaded");

    // Open the key-value store and restore the persisted cart
    let kv = KvStore::open(config.kv_path())
        .await
        .expect("Failed to open key-value store");
    let tracker = Tracker::new(Arc::new(LogSink));
    let cart = CartStore::restore(kv, tracker.clone()).await;

    // Build application state
    let state = AppState::new(config.clone(), catalog, cart, tracker);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
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
