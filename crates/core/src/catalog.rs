//! The static, read-only product catalog.
//!
//! The catalog is supplied by the host once at startup and never mutated for
//! the lifetime of the session. Records keep their supplied order (the grid
//! default and the tie-break order for every sort), while an id index makes
//! cart lookups cheap.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, ProductId};

/// Errors detected while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),
    #[error("negative price for product {0}")]
    NegativePrice(ProductId),
}

/// Product availability state, in schema.org vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    InStock,
    OutOfStock,
    PreOrder,
}

impl Availability {
    /// The schema.org URL form used in structured data offers.
    #[must_use]
    pub const fn schema_url(self) -> &'static str {
        match self {
            Self::InStock => "https://schema.org/InStock",
            Self::OutOfStock => "https://schema.org/OutOfStock",
            Self::PreOrder => "https://schema.org/PreOrder",
        }
    }
}

/// A single catalog entry. Immutable for the session.
///
/// Field names mirror the catalog JSON the host supplies: `img` is an opaque
/// image reference (the demo data uses color swatches), `badge`/`brand`/`sku`
/// are optional presentation and structured-data extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
    #[serde(rename = "img")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
}

/// An ordered, id-indexed collection of [`ProductRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ProductRecord>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from records, validating the id-uniqueness and
    /// non-negative-price invariants. Supplied order is preserved.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if two records share an id or a price is
    /// negative.
    pub fn new(records: Vec<ProductRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.price.is_negative() {
                return Err(CatalogError::NegativePrice(record.id.clone()));
            }
            if index.insert(record.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self { records, index })
    }

    /// An empty catalog (an absent catalog source is not an error).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&ProductRecord> {
        self.index
            .get(id)
            .and_then(|&position| self.records.get(position))
    }

    /// Iterate records in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ProductRecord;
    type IntoIter = core::slice::Iter<'a, ProductRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn record(id: &str, title: &str, cents: i64) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Money::new(Decimal::new(cents, 2)),
            image: "#888888".to_string(),
            sku: None,
            badge: None,
            brand: None,
            availability: Availability::default(),
            popularity: None,
        }
    }

    #[test]
    fn test_lookup_and_order() {
        let catalog = Catalog::new(vec![record("a", "Apple", 1000), record("b", "Banana", 500)])
            .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&ProductId::new("b")).unwrap().title, "Banana");
        assert!(catalog.get(&ProductId::new("zz")).is_none());

        let titles: Vec<_> = catalog.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Apple", "Banana"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![record("a", "Apple", 1000), record("a", "Again", 500)]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(_))));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = Catalog::new(vec![record("a", "Apple", -1)]);
        assert!(matches!(result, Err(CatalogError::NegativePrice(_))));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 0);
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let record: ProductRecord =
            serde_json::from_str(r##"{"id":"a","title":"Apple","price":10,"img":"#f00"}"##).unwrap();
        assert_eq!(record.availability, Availability::InStock);
        assert!(record.popularity.is_none());
        assert!(record.badge.is_none());
    }

    #[test]
    fn test_availability_schema_url() {
        assert_eq!(
            Availability::OutOfStock.schema_url(),
            "https://schema.org/OutOfStock"
        );
    }
}
