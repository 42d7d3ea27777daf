//! Ankkor Core - Shared types library.
//!
//! This crate provides common types used across the Ankkor components:
//! - `storefront` - Shopify data layer (client, normalizers, cache, stores)
//! - `cli` - Command-line surface over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Shopify global IDs and decimal prices with currency codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
