//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product grid page
//! GET  /health                 - Health check
//! GET  /grid                   - Grid items fragment (HTMX; `q`, `sort`)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Drawer body fragment (rows + subtotal)
//! GET  /cart/count             - Cart count badge fragment
//! POST /cart/add               - Add one of a product (opens the drawer)
//! POST /cart/update            - Apply a quantity delta
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout
//! POST /cart/checkout          - Download order.json and clear the cart
//!
//! # Assets
//! GET  /manifest.webmanifest   - Web app manifest
//! GET  /static/*               - Stylesheet and client script
//! ```

pub mod cart;
pub mod grid;
pub mod manifest;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::items))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/checkout", post(cart::checkout))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Grid
        .route("/", get(grid::page))
        .route("/grid", get(grid::items))
        // Cart routes
        .nest("/cart", cart_routes())
        // Web app manifest
        .route("/manifest.webmanifest", get(manifest::webmanifest))
}
