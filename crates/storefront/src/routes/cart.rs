//! Cart route handlers.
//!
//! Mutations respond with the affected product's quantity fragment plus an
//! `HX-Trigger` header carrying the events the page reacts to: `cart-updated`
//! refreshes the badge and drawer, `open-drawer` reveals the drawer after an
//! add, and `toast` shows a short notice. The badge and drawer re-render by
//! fetching their own fragments, so their numbers are always rederived from
//! the stored line items rather than patched incrementally.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use liteshop_core::{Cart, CartSummary, LineMutation, Money, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub id: String,
}

/// Quantity delta form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub id: String,
    pub delta: i32,
}

/// Drawer row display data for templates.
pub struct CartRow {
    pub title: String,
    /// Swatch color shown in place of a product photo.
    pub color: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Build display rows from the cart, ordered by product id.
pub fn cart_rows(cart: &Cart) -> Vec<CartRow> {
    cart.items()
        .map(|item| CartRow {
            title: item.title.clone(),
            color: item.image.clone(),
            unit_price: item.price.to_string(),
            quantity: item.quantity,
            line_total: item.price.times(item.quantity).to_string(),
        })
        .collect()
}

/// Cart drawer body fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub rows: Vec<CartRow>,
    pub subtotal: String,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Per-card quantity fragment template returned from mutations.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_qty.html")]
pub struct ProductQtyTemplate {
    pub id: String,
    pub quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Drawer body: current rows and subtotal (HTMX).
#[instrument(skip(state))]
pub async fn items(State(state): State<AppState>) -> impl IntoResponse {
    let cart = state.cart().snapshot().await;
    let summary = CartSummary::of(&cart);

    CartItemsTemplate {
        rows: cart_rows(&cart),
        subtotal: summary.subtotal.to_string(),
    }
}

/// Cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.cart().summary().await;

    CartCountTemplate {
        count: summary.count,
    }
}

/// Add one of a product and open the drawer (HTMX).
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddForm>) -> Result<Response> {
    apply(&state, form.id, 1, true).await
}

/// Apply a signed quantity delta without opening the drawer (HTMX).
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateForm>,
) -> Result<Response> {
    apply(&state, form.id, form.delta, false).await
}

/// Shared mutation flow for add and update.
///
/// An unknown product id is a no-op: nothing is stored and no events fire,
/// so the response is an empty 204.
async fn apply(state: &AppState, id: String, delta: i32, open_drawer: bool) -> Result<Response> {
    let id = ProductId::from(id);
    let Some(mutation) = state.cart().mutate(state.catalog(), &id, delta).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let triggers = mutation_triggers(&mutation, delta, open_drawer);
    let quantity = ProductQtyTemplate {
        id: mutation.id.as_str().to_string(),
        quantity: mutation.quantity,
    };

    Ok((AppendHeaders([("HX-Trigger", triggers)]), quantity).into_response())
}

/// Empty the cart (HTMX). The page refresh rides on `cart-updated`.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> impl IntoResponse {
    state.cart().clear().await;

    (
        AppendHeaders([("HX-Trigger", r#"{"cart-updated":null}"#)]),
        (),
    )
}

/// Export the cart as a downloadable `order.json` and empty it.
///
/// The order document holds the line items and the derived total. Checkout
/// with no line items is rejected with 409 before anything is cleared.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<Response> {
    let Some(items) = state.cart().take().await else {
        return Err(AppError::EmptyCart);
    };

    let total: Money = items
        .iter()
        .map(|item| item.price.times(item.quantity))
        .sum();
    let order = json!({
        "order_id": Uuid::new_v4(),
        "order": items,
        "total": total,
    });
    let body = serde_json::to_string_pretty(&order)?;

    tracing::info!(lines = items.len(), %total, "order exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"order.json\"",
            ),
        ],
        body,
    )
        .into_response())
}

// =============================================================================
// HX-Trigger Helpers
// =============================================================================

/// Build the `HX-Trigger` event map for a mutation.
fn mutation_triggers(mutation: &LineMutation, delta: i32, open_drawer: bool) -> String {
    let action = if delta > 0 { "added" } else { "updated" };
    let toast = format!("{} \u{2014} {}", mutation.title, action);

    let mut events = serde_json::Map::new();
    events.insert("cart-updated".to_string(), Value::Null);
    if open_drawer {
        events.insert("open-drawer".to_string(), Value::Null);
    }
    events.insert("toast".to_string(), Value::String(toast));

    header_safe_json(&Value::Object(events))
}

/// Serialize a JSON value with every non-ASCII character `\u`-escaped.
///
/// Header values travel as bytes and browsers decode them as Latin-1, so raw
/// UTF-8 in `HX-Trigger` would reach the page mangled. Escaping keeps the
/// header pure ASCII while `JSON.parse` on the client restores the original
/// characters.
fn header_safe_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    let mut buf = [0_u16; 2];

    for ch in raw.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            for unit in ch.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }

    out
}
