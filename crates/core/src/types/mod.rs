//! Core types for Ankkor.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;

pub use id::{GidError, ShopifyGid};
pub use price::{CurrencyCode, Price, PriceError};
