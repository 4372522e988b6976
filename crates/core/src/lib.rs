//! LiteShop Core - Pure domain logic.
//!
//! This crate provides the state logic shared by the LiteShop binaries:
//! - `storefront` - Public product grid with a persistent cart
//! - `offline` - Versioned offline caching gateway
//! - `cli` - Command-line tools for seeding and cache management
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP, no filesystem access. Everything here is testable headlessly:
//! cart mutation, derived aggregates, the filter/sort pipeline, and
//! schema.org graph generation all operate on plain values.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers and money
//! - [`catalog`] - The static read-only product catalog
//! - [`cart`] - Cart state transitions and derived aggregates
//! - [`pipeline`] - Filter/sort view over the catalog
//! - [`schema`] - schema.org JSON-LD product graph generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use cart::{Cart, CartSummary, LineItem, LineMutation};
pub use catalog::{Availability, Catalog, CatalogError, ProductRecord};
pub use pipeline::{SortMode, view};
pub use types::*;
