//! LiteShop offline gateway library.
//!
//! A caching reverse proxy in front of the storefront that mirrors the
//! lifecycle and fetch strategies of a service worker: precache a versioned
//! manifest on install, prune stale cache generations on activate, then
//! serve documents network-first and assets cache-first.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod gateway;
pub mod manifest;
pub mod store;
pub mod worker;
