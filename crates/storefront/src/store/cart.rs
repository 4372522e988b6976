//! Persistent cart on top of the key-value store.
//!
//! The live cart is held in memory behind an async mutex and written through
//! to the key-value store under [`CART_KEY`] on every mutation, so a mutation
//! response is never sent before the new state is durable. Restart recovery
//! reads the same key back; a malformed stored cart restores as empty rather
//! than blocking startup.

use liteshop_core::{Cart, CartSummary, Catalog, LineItem, LineMutation, ProductId};
use tokio::sync::Mutex;

use crate::analytics::Tracker;

use super::kv::{KvError, KvStore};

/// Key-value store key holding the serialized cart.
pub const CART_KEY: &str = "liteshop_cart_v2";

/// Shared cart state with write-through persistence.
pub struct CartStore {
    kv: KvStore,
    cart: Mutex<Cart>,
    tracker: Tracker,
}

impl CartStore {
    /// Restore the cart from the key-value store.
    pub async fn restore(kv: KvStore, tracker: Tracker) -> Self {
        let cart = kv.get::<Cart>(CART_KEY).await.unwrap_or_default();
        if !cart.is_empty() {
            tracing::info!(lines = cart.len(), "restored cart from disk");
        }

        Self {
            kv,
            cart: Mutex::new(cart),
            tracker,
        }
    }

    /// Apply a quantity delta for a product, persisting before returning.
    ///
    /// An unknown product is a silent no-op: nothing is persisted or
    /// tracked and `Ok(None)` is returned. When the write fails the
    /// in-memory cart is rolled back so memory and disk stay consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutated cart cannot be persisted.
    pub async fn mutate(
        &self,
        catalog: &Catalog,
        id: &ProductId,
        delta: i32,
    ) -> Result<Option<LineMutation>, KvError> {
        let mut cart = self.cart.lock().await;
        let previous = cart.clone();

        let Some(mutation) = cart.mutate(catalog, id, delta) else {
            return Ok(None);
        };

        if let Err(error) = self.kv.set(CART_KEY, &*cart).await {
            *cart = previous;
            return Err(error);
        }

        self.tracker.cart_update(&mutation.id, mutation.quantity);
        Ok(Some(mutation))
    }

    /// Clone of the current cart for rendering.
    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// Aggregates rederived from the current line items.
    pub async fn summary(&self) -> CartSummary {
        CartSummary::of(&*self.cart.lock().await)
    }

    /// Take every line item for order export, leaving the cart empty.
    ///
    /// Returns `None` when the cart is empty. The order has already been
    /// handed to the caller by the time the removal is persisted, so a
    /// failed write is logged rather than returned.
    pub async fn take(&self) -> Option<Vec<LineItem>> {
        let mut cart = self.cart.lock().await;
        if cart.is_empty() {
            return None;
        }

        let taken = std::mem::take(&mut *cart);
        if let Err(error) = self.kv.remove(CART_KEY).await {
            tracing::warn!(%error, "failed to persist cart removal after checkout");
        }

        Some(taken.into_items())
    }

    /// Remove every line item. A failed write is logged, not returned.
    pub async fn clear(&self) {
        let mut cart = self.cart.lock().await;
        cart.clear();
        if let Err(error) = self.kv.remove(CART_KEY).await {
            tracing::warn!(%error, "failed to persist cart clear");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use liteshop_core::{Availability, Money, ProductRecord};

    use crate::analytics::{Event, EventSink};

    use super::*;

    struct NullSink;

    impl EventSink for NullSink {
        fn record(&self, _event: &Event) {}
    }

    #[derive(Default)]
    struct RecordingSink {
        events: std::sync::Mutex<Vec<Event>>,
    }

    impl EventSink for RecordingSink {
        fn record(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join("liteshop-cart-tests")
            .join(format!("{}.json", uuid::Uuid::new_v4()))
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![ProductRecord {
            id: ProductId::new("lamp"),
            title: "Aurora Lamp".to_string(),
            price: Money::new(Decimal::new(4900, 2)),
            image: "#38bdf8".to_string(),
            sku: None,
            badge: None,
            brand: None,
            availability: Availability::default(),
            popularity: None,
        }])
        .unwrap()
    }

    async fn store_at(path: PathBuf) -> CartStore {
        let kv = KvStore::open(path).await.unwrap();
        CartStore::restore(kv, Tracker::new(Arc::new(NullSink))).await
    }

    #[tokio::test]
    async fn test_mutation_survives_restart() {
        let path = scratch_path();
        let id = ProductId::new("lamp");

        let store = store_at(path.clone()).await;
        store.mutate(&catalog(), &id, 2).await.unwrap();
        drop(store);

        let restored = store_at(path.clone()).await;
        assert_eq!(restored.snapshot().await.quantity_of(&id), 2);
        assert_eq!(restored.summary().await.count, 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_unknown_product_persists_nothing() {
        let path = scratch_path();

        let store = store_at(path.clone()).await;
        let result = store
            .mutate(&catalog(), &ProductId::new("ghost"), 1)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_mutation_emits_cart_update() {
        let sink = Arc::new(RecordingSink::default());
        let kv = KvStore::open(scratch_path()).await.unwrap();
        let store = CartStore::restore(kv, Tracker::new(sink.clone())).await;
        let id = ProductId::new("lamp");

        store.mutate(&catalog(), &id, 1).await.unwrap();
        store.mutate(&catalog(), &ProductId::new("ghost"), 1).await.unwrap();

        let events = sink.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![Event::CartUpdate {
                id,
                quantity: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_take_exports_and_clears() {
        let path = scratch_path();
        let id = ProductId::new("lamp");

        let store = store_at(path.clone()).await;
        store.mutate(&catalog(), &id, 3).await.unwrap();

        let items = store.take().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 3);
        assert_eq!(store.summary().await.count, 0);

        // the cleared cart is what a restart sees
        let restored = store_at(path).await;
        assert_eq!(restored.snapshot().await.quantity_of(&id), 0);
    }

    #[tokio::test]
    async fn test_take_on_empty_cart_is_none() {
        let store = store_at(scratch_path()).await;
        assert!(store.take().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_cart_and_disk() {
        let path = scratch_path();
        let id = ProductId::new("lamp");

        let store = store_at(path.clone()).await;
        store.mutate(&catalog(), &id, 2).await.unwrap();
        store.clear().await;

        assert!(store.snapshot().await.is_empty());

        let restored = store_at(path).await;
        assert_eq!(restored.snapshot().await.quantity_of(&id), 0);
    }

    #[tokio::test]
    async fn test_malformed_stored_cart_restores_empty() {
        let path = scratch_path();

        let kv = KvStore::open(path.clone()).await.unwrap();
        kv.set(CART_KEY, &"definitely not a cart".to_string())
            .await
            .unwrap();
        drop(kv);

        let store = store_at(path.clone()).await;
        assert!(store.snapshot().await.is_empty());

        std::fs::remove_file(&path).unwrap();
    }
}
