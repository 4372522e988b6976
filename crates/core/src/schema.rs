//! schema.org structured data for the product grid.

use serde_json::{Value, json};

use crate::catalog::Catalog;

/// House brand substituted when a record carries none.
pub const HOUSE_BRAND: &str = "LiteShop";

/// Build the JSON-LD `@graph` of `Product` nodes embedded in the grid page.
///
/// Offers are priced in USD with exactly two decimals. `sku` is emitted only
/// when the record has one; a missing brand falls back to [`HOUSE_BRAND`].
#[must_use]
pub fn product_graph(catalog: &Catalog) -> Value {
    let items: Vec<Value> = catalog
        .iter()
        .map(|record| {
            let mut node = json!({
                "@type": "Product",
                "name": record.title,
                "brand": {
                    "@type": "Brand",
                    "name": record.brand.as_deref().unwrap_or(HOUSE_BRAND),
                },
                "offers": {
                    "@type": "Offer",
                    "priceCurrency": "USD",
                    "price": record.price.to_fixed(),
                    "availability": record.availability.schema_url(),
                },
            });
            if let (Some(sku), Some(node)) = (&record.sku, node.as_object_mut()) {
                node.insert("sku".to_string(), json!(sku));
            }
            node
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@graph": items,
    })
}
