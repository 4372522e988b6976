//! Application state shared across handlers.

use std::sync::Arc;

use liteshop_core::{Catalog, schema};

use crate::analytics::Tracker;
use crate::config::StorefrontConfig;
use crate::store::CartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the cart store, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: CartStore,
    tracker: Tracker,
    schema: serde_json::Value,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The structured-data graph is built once here; the catalog never
    /// changes after startup, so neither does the graph.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        cart: CartStore,
        tracker: Tracker,
    ) -> Self {
        let schema = schema::product_graph(&catalog);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                tracker,
                schema,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the analytics tracker.
    #[must_use]
    pub fn tracker(&self) -> &Tracker {
        &self.inner.tracker
    }

    /// Get the prebuilt schema.org product graph.
    #[must_use]
    pub fn schema(&self) -> &serde_json::Value {
        &self.inner.schema
    }
}
