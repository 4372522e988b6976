//! Integration test harness for LiteShop.
//!
//! Tests boot the real routers in-process on ephemeral ports and drive them
//! over HTTP with `reqwest`, the same way a browser (or the offline gateway)
//! would. Each helper hands back a [`TestServer`] that tears itself down when
//! the test finishes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use liteshop_core::{Availability, Catalog, Money, ProductId, ProductRecord};
use liteshop_storefront::analytics::{LogSink, Tracker};
use liteshop_storefront::config::StorefrontConfig;
use liteshop_storefront::routes;
use liteshop_storefront::state::AppState;
use liteshop_storefront::store::{CartStore, KvStore};

// ===== Test Server =====

/// A router served on an ephemeral port for the duration of a test.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve `app` on a loopback port picked by the OS.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, handle }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Stop serving and wait for the listener to close, so later requests
    /// see a dead port. Simulates the origin going offline.
    pub async fn shutdown(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ===== Storefront Fixtures =====

/// Scratch key-value store path, unique per call.
#[must_use]
pub fn scratch_kv_path() -> PathBuf {
    std::env::temp_dir()
        .join("liteshop-integration-tests")
        .join(format!("{}.json", uuid::Uuid::new_v4()))
}

/// Four products with distinct prices and popularity scores, so ordering
/// assertions are unambiguous. A subset of the shipped demo catalog.
#[must_use]
pub fn demo_catalog() -> Catalog {
    let records = vec![
        product("p1", "Aurora Desk Lamp", 4900, 87),
        product("p2", "Basalt Mug", 1950, 74),
        ProductRecord {
            badge: Some("Limited".to_string()),
            ..product("p5", "Ember Wool Throw", 8900, 58)
        },
        product("p6", "Flint Notebook", 1250, 79),
    ];

    Catalog::new(records).expect("demo catalog is valid")
}

fn product(id: &str, title: &str, price_cents: i64, popularity: u32) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Money::new(Decimal::new(price_cents, 2)),
        image: "#334155".to_string(),
        sku: None,
        badge: None,
        brand: None,
        availability: Availability::InStock,
        popularity: Some(popularity),
    }
}

/// Boot a storefront backed by the demo catalog and a fresh scratch
/// key-value store.
pub async fn spawn_storefront() -> TestServer {
    spawn_storefront_with_kv(scratch_kv_path()).await
}

/// Boot a storefront against a specific key-value store path. Spawning twice
/// with the same path simulates a restart.
///
/// # Panics
///
/// Panics if the key-value store cannot be opened.
pub async fn spawn_storefront_with_kv(kv_path: PathBuf) -> TestServer {
    let config = StorefrontConfig {
        host: "127.0.0.1".parse().expect("loopback address"),
        port: 0,
        catalog_path: PathBuf::from("data/catalog.json"),
        data_dir: kv_path
            .parent()
            .expect("scratch path has a parent")
            .to_path_buf(),
        asset_version: "4".to_string(),
    };

    let kv = KvStore::open(kv_path).await.expect("open scratch kv store");
    let tracker = Tracker::new(Arc::new(LogSink));
    let cart = CartStore::restore(kv, tracker.clone()).await;
    let state = AppState::new(config, demo_catalog(), cart, tracker);

    TestServer::spawn(routes::routes().with_state(state)).await
}
