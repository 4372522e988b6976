//! Persistent storefront state.
//!
//! A single JSON key-value file backs everything the storefront remembers
//! between restarts; the cart store layers cart semantics on top of it.

pub mod cart;
pub mod kv;

pub use cart::{CART_KEY, CartStore};
pub use kv::{KvError, KvStore};
