//! Grid view derivation: filter, then sort.
//!
//! The view is a fresh projection over the full catalog on every call. The
//! filter hides records without touching them, so narrowing and then clearing
//! a query always restores the complete grid.

use crate::catalog::{Catalog, ProductRecord};

/// Sort orders for the product grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Cheapest first.
    PriceAscending,
    /// Most expensive first.
    PriceDescending,
    /// Title A to Z.
    TitleAlphabetical,
    /// Most popular first, the storefront default.
    #[default]
    Popularity,
}

impl SortMode {
    /// Map a query-string value to a sort mode.
    ///
    /// Unrecognized values fall back to [`SortMode::Popularity`] rather than
    /// erroring, so a hand-edited URL still renders the grid.
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "asc" => Self::PriceAscending,
            "desc" => Self::PriceDescending,
            "az" => Self::TitleAlphabetical,
            _ => Self::Popularity,
        }
    }

    /// The canonical query-string value for this mode.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::PriceAscending => "asc",
            Self::PriceDescending => "desc",
            Self::TitleAlphabetical => "az",
            Self::Popularity => "pop",
        }
    }
}

/// Derive the grid view for a query and sort mode.
///
/// The query is trimmed and matched case-insensitively against product
/// titles; an empty query matches everything. The title sort ignores case as
/// well. Sorts are stable, so records that compare equal keep their catalog
/// order, and a missing popularity score sorts as 0.
#[must_use]
pub fn view<'a>(catalog: &'a Catalog, query: &str, sort: SortMode) -> Vec<&'a ProductRecord> {
    let needle = query.trim().to_lowercase();
    let mut records: Vec<&ProductRecord> = catalog
        .iter()
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .collect();

    match sort {
        SortMode::PriceAscending => records.sort_by(|a, b| a.price.cmp(&b.price)),
        SortMode::PriceDescending => records.sort_by(|a, b| b.price.cmp(&a.price)),
        SortMode::TitleAlphabetical => {
            records.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        SortMode::Popularity => records
            .sort_by(|a, b| b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0))),
    }

    records
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use crate::catalog::{Availability, ProductRecord};
    use crate::types::{Money, ProductId};

    use super::*;

    fn record(id: &str, title: &str, cents: i64, popularity: Option<u32>) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Money::new(Decimal::new(cents, 2)),
            image: "#123456".to_string(),
            sku: None,
            badge: None,
            brand: None,
            availability: Availability::default(),
            popularity,
        }
    }

    fn ids(view: &[&ProductRecord]) -> Vec<String> {
        view.iter().map(|r| r.id.as_str().to_string()).collect()
    }

    #[test]
    fn test_from_param_maps_known_values() {
        assert_eq!(SortMode::from_param("asc"), SortMode::PriceAscending);
        assert_eq!(SortMode::from_param("desc"), SortMode::PriceDescending);
        assert_eq!(SortMode::from_param("az"), SortMode::TitleAlphabetical);
        assert_eq!(SortMode::from_param("pop"), SortMode::Popularity);
    }

    #[test]
    fn test_from_param_falls_back_to_popularity() {
        assert_eq!(SortMode::from_param(""), SortMode::Popularity);
        assert_eq!(SortMode::from_param("cheapest"), SortMode::Popularity);
    }

    #[test]
    fn test_price_ascending() {
        // a at 10.00 and b at 5.00 sort as [b, a]
        let catalog =
            Catalog::new(vec![record("a", "Apple", 1000, None), record("b", "Banana", 500, None)])
                .unwrap();
        let view = view(&catalog, "", SortMode::PriceAscending);
        assert_eq!(ids(&view), ["b", "a"]);
    }

    #[test]
    fn test_price_descending() {
        let catalog =
            Catalog::new(vec![record("b", "Banana", 500, None), record("a", "Apple", 1000, None)])
                .unwrap();
        let view = view(&catalog, "", SortMode::PriceDescending);
        assert_eq!(ids(&view), ["a", "b"]);
    }

    #[test]
    fn test_title_alphabetical() {
        let catalog =
            Catalog::new(vec![record("b", "Banana", 500, None), record("a", "Apple", 1000, None)])
                .unwrap();
        let view = view(&catalog, "", SortMode::TitleAlphabetical);
        assert_eq!(ids(&view), ["a", "b"]);
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let catalog = Catalog::new(vec![
            record("z", "Zinc Stand", 700, None),
            record("a", "aurora lamp", 1000, None),
            record("b", "Basalt Mug", 500, None),
        ])
        .unwrap();
        let view = view(&catalog, "", SortMode::TitleAlphabetical);
        assert_eq!(ids(&view), ["a", "b", "z"]);
    }

    #[test]
    fn test_popularity_descending_with_missing_scores_last() {
        let catalog = Catalog::new(vec![
            record("low", "Low", 100, Some(2)),
            record("none", "None", 100, None),
            record("high", "High", 100, Some(9)),
        ])
        .unwrap();
        let view = view(&catalog, "", SortMode::Popularity);
        assert_eq!(ids(&view), ["high", "low", "none"]);
    }

    #[test]
    fn test_equal_keys_keep_catalog_order() {
        let catalog = Catalog::new(vec![
            record("first", "Mug", 900, Some(5)),
            record("second", "Cap", 900, Some(5)),
            record("third", "Pen", 900, Some(5)),
        ])
        .unwrap();
        for sort in [SortMode::PriceAscending, SortMode::PriceDescending, SortMode::Popularity] {
            let view = view(&catalog, "", sort);
            assert_eq!(ids(&view), ["first", "second", "third"]);
        }
    }

    #[test]
    fn test_filter_is_trimmed_and_case_insensitive() {
        let catalog = Catalog::new(vec![
            record("a", "Aurora Lamp", 1000, None),
            record("b", "Basalt Mug", 500, None),
        ])
        .unwrap();
        let view = view(&catalog, "  AURORA  ", SortMode::Popularity);
        assert_eq!(ids(&view), ["a"]);
    }

    #[test]
    fn test_filter_without_match_yields_empty_view() {
        let catalog = Catalog::new(vec![record("a", "Aurora Lamp", 1000, None)]).unwrap();
        assert!(view(&catalog, "zzz", SortMode::Popularity).is_empty());
    }

    #[test]
    fn test_clearing_the_query_restores_the_full_grid() {
        let catalog = Catalog::new(vec![
            record("a", "Aurora Lamp", 1000, Some(3)),
            record("b", "Basalt Mug", 500, Some(7)),
        ])
        .unwrap();
        assert_eq!(view(&catalog, "mug", SortMode::Popularity).len(), 1);
        assert_eq!(view(&catalog, "", SortMode::Popularity).len(), 2);
    }

    #[test]
    fn test_view_is_deterministic() {
        let catalog = Catalog::new(vec![
            record("a", "Aurora Lamp", 1000, Some(3)),
            record("b", "Basalt Mug", 500, Some(7)),
            record("c", "Cedar Tray", 500, None),
        ])
        .unwrap();
        let first = ids(&view(&catalog, "a", SortMode::PriceAscending));
        let second = ids(&view(&catalog, "a", SortMode::PriceAscending));
        assert_eq!(first, second);
    }
}
