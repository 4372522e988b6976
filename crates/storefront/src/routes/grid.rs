//! Product grid route handlers.
//!
//! The grid is rederived from the full catalog on every request: filter by
//! the `q` query, then apply the `sort` mode. Search and sort never mutate
//! the catalog, so clearing the query restores the complete grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::instrument;

use liteshop_core::{Cart, CartSummary, ProductRecord, SortMode, view};

use crate::filters;
use crate::routes::cart::{CartRow, cart_rows};
use crate::state::AppState;

/// Grid query parameters.
#[derive(Debug, Deserialize)]
pub struct GridQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
}

/// Product card display data for templates.
pub struct ProductCard {
    pub id: String,
    pub title: String,
    pub price: String,
    pub badge: Option<String>,
    pub thumb: String,
    pub quantity: u32,
}

impl ProductCard {
    fn from_record(record: &ProductRecord, cart: &Cart) -> Self {
        Self {
            id: record.id.as_str().to_string(),
            title: record.title.clone(),
            price: record.price.to_string(),
            badge: record.badge.clone(),
            thumb: thumb_data_uri(&record.image),
            quantity: cart.quantity_of(&record.id),
        }
    }
}

/// Placeholder thumbnail: a solid-color SVG rectangle as a data URI.
fn thumb_data_uri(color: &str) -> String {
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='640' height='360'%3E%3Crect width='100%25' height='100%25' fill='{}'/%3E%3C/svg%3E",
        urlencoding::encode(color)
    )
}

/// Full grid page template.
#[derive(Template, WebTemplate)]
#[template(path = "grid.html")]
pub struct GridTemplate {
    pub cards: Vec<ProductCard>,
    pub query: String,
    pub sort_param: &'static str,
    pub count: u64,
    pub rows: Vec<CartRow>,
    pub subtotal: String,
    pub schema: serde_json::Value,
    pub asset_version: String,
}

/// Grid items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/grid_items.html")]
pub struct GridItemsTemplate {
    pub cards: Vec<ProductCard>,
}

/// Build the cards for the current query and sort.
async fn cards(state: &AppState, query: &GridQuery, sort: SortMode) -> (Vec<ProductCard>, Cart) {
    let cart = state.cart().snapshot().await;
    let cards = view(state.catalog(), &query.q, sort)
        .into_iter()
        .map(|record| ProductCard::from_record(record, &cart))
        .collect();
    (cards, cart)
}

/// Full grid page.
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> impl IntoResponse {
    let sort = SortMode::from_param(&query.sort);
    let (cards, cart) = cards(&state, &query, sort).await;
    let summary = CartSummary::of(&cart);

    state.tracker().page_view();

    GridTemplate {
        cards,
        query: query.q,
        sort_param: sort.as_param(),
        count: summary.count,
        rows: cart_rows(&cart),
        subtotal: summary.subtotal.to_string(),
        schema: state.schema().clone(),
        asset_version: state.config().asset_version.clone(),
    }
}

/// Grid items fragment (HTMX), driven by the search box and sort select.
#[instrument(skip(state))]
pub async fn items(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> impl IntoResponse {
    let sort = SortMode::from_param(&query.sort);
    let (cards, _) = cards(&state, &query, sort).await;

    GridItemsTemplate { cards }
}
