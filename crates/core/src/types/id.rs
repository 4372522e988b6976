//! Newtype ID for type-safe product references.
//!
//! Product identifiers are stable, unique strings supplied by the catalog
//! source. Wrapping them prevents accidentally mixing identifiers with other
//! string data such as titles or image references.

use serde::{Deserialize, Serialize};

/// A stable, unique product identifier.
///
/// Serializes transparently as a plain string, so it can be used directly
/// as a JSON object key in the persisted cart mapping.
///
/// # Example
///
/// ```rust
/// use liteshop_core::ProductId;
///
/// let id = ProductId::new("sku-oak-01");
/// assert_eq!(id.as_str(), "sku-oak-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_inner() {
        let id = ProductId::new("a1");
        assert_eq!(id.to_string(), "a1");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ProductId::new("a1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1\"");
    }

    #[test]
    fn test_usable_as_json_object_key() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(ProductId::new("a"), 1_u32);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "{\"a\":1}");

        let back: BTreeMap<ProductId, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&ProductId::new("a")), Some(&1));
    }
}
