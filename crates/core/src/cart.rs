//! Cart state transitions and derived aggregates.
//!
//! The cart is a mapping from product id to [`LineItem`]. Every line item
//! carries a denormalized copy of the product's title, price and image taken
//! at add-time, so cart display never depends on catalog lookups.
//!
//! # Invariants
//!
//! - A line item's quantity is always >= 1 while the entry exists; a
//!   mutation that reaches quantity 0 removes the entry instead of storing it.
//! - Total count and subtotal are never stored. [`CartSummary::of`] rederives
//!   them by summation after every mutation, so the displayed aggregates
//!   cannot drift from the line items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::types::{Money, ProductId};

/// A cart entry denormalized from a product record at add-time.
///
/// Serialized field names (`qty`, `img`) match the persisted cart layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
    #[serde(rename = "img")]
    pub image: String,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

/// The result of an applied cart mutation.
///
/// `quantity` is the resulting quantity for the product; 0 signals that the
/// entry was removed. Carries the product title so callers (analytics,
/// notifications) can react without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMutation {
    pub id: ProductId,
    pub title: String,
    pub quantity: u32,
}

/// Aggregates derived from the cart by summation. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Total quantity across all line items.
    pub count: u64,
    /// Sum of price x quantity across all line items.
    pub subtotal: Money,
}

impl CartSummary {
    /// Derive the aggregates for a cart.
    #[must_use]
    pub fn of(cart: &Cart) -> Self {
        Self {
            count: cart.items().map(|item| u64::from(item.quantity)).sum(),
            subtotal: cart.items().map(|item| item.price.times(item.quantity)).sum(),
        }
    }
}

/// Mapping from product id to line item.
///
/// Serializes transparently as a JSON object keyed by product id, the exact
/// shape persisted to the key-value store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<ProductId, LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a quantity delta for a product.
    ///
    /// Looks the product up in the catalog; an unknown id is a silent no-op
    /// returning `None`, never an error. Otherwise the entry is found or
    /// created (quantity 0, fields copied from the record), the new quantity
    /// is `max(0, old + delta)`, and a resulting quantity of 0 removes the
    /// entry while anything else upserts it.
    pub fn mutate(
        &mut self,
        catalog: &Catalog,
        id: &ProductId,
        delta: i32,
    ) -> Option<LineMutation> {
        let record = catalog.get(id)?;

        let current = self
            .items
            .get(id)
            .map_or(0, |item| item.quantity);
        let next = (i64::from(current) + i64::from(delta)).max(0);
        let quantity = u32::try_from(next).unwrap_or(u32::MAX);

        if quantity == 0 {
            self.items.remove(id);
        } else {
            let item = self.items.entry(id.clone()).or_insert_with(|| LineItem {
                id: record.id.clone(),
                title: record.title.clone(),
                price: record.price,
                image: record.image.clone(),
                quantity: 0,
            });
            item.quantity = quantity;
        }

        Some(LineMutation {
            id: id.clone(),
            title: record.title.clone(),
            quantity,
        })
    }

    /// Current quantity for a product, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.items.get(id).map_or(0, |item| item.quantity)
    }

    /// Iterate line items (ordered by product id).
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.values()
    }

    /// Consume the cart, yielding its line items (for order export).
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items.into_values().collect()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove all line items.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
