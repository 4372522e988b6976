//! Demo catalog seeding.
//!
//! Writes the built-in demo products as pretty-printed JSON in the shape the
//! storefront loads at startup.
//!
//! # Usage
//!
//! ```bash
//! # Write the demo catalog to the default location
//! liteshop seed
//!
//! # Write it somewhere else
//! liteshop seed -o /tmp/catalog.json
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

use liteshop_core::{Availability, Money, ProductId, ProductRecord};

/// Write the demo catalog to `output`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub async fn catalog(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let records = demo_products();
    let json = serde_json::to_string_pretty(&records)?;

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, format!("{json}\n")).await?;

    info!(path = %output.display(), products = records.len(), "Catalog written");
    Ok(())
}

/// The demo products: color-swatch images, a few badges, and distinct prices
/// and popularity so every sort order is visible in the grid.
fn demo_products() -> Vec<ProductRecord> {
    vec![
        ProductRecord {
            sku: Some("LS-LAMP-01".to_string()),
            badge: Some("New".to_string()),
            brand: Some("LiteShop Studio".to_string()),
            ..product("p1", "Aurora Desk Lamp", 4900, "#38bdf8", 87)
        },
        ProductRecord {
            sku: Some("LS-MUG-02".to_string()),
            ..product("p2", "Basalt Mug", 1950, "#64748b", 74)
        },
        ProductRecord {
            badge: Some("Sale".to_string()),
            brand: Some("LiteShop Studio".to_string()),
            ..product("p3", "Cedar Serving Tray", 3200, "#b45309", 91)
        },
        product("p4", "Drift Candle", 1425, "#f59e0b", 66),
        ProductRecord {
            sku: Some("LS-THROW-05".to_string()),
            badge: Some("Limited".to_string()),
            ..product("p5", "Ember Wool Throw", 8900, "#dc2626", 58)
        },
        product("p6", "Flint Notebook", 1250, "#334155", 79),
        ProductRecord {
            brand: Some("Gale Gear".to_string()),
            ..product("p7", "Gale Water Bottle", 2400, "#0ea5e9", 83)
        },
        ProductRecord {
            badge: Some("New".to_string()),
            ..product("p8", "Harbor Tote", 3975, "#14b8a6", 70)
        },
    ]
}

fn product(
    id: &str,
    title: &str,
    price_cents: i64,
    image: &str,
    popularity: u32,
) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Money::new(Decimal::new(price_cents, 2)),
        image: image.to_string(),
        sku: None,
        badge: None,
        brand: None,
        availability: Availability::InStock,
        popularity: Some(popularity),
    }
}
