//! Ankkor storefront data layer.
//!
//! Talks to the Shopify Storefront API and keeps the shopper's client state:
//!
//! - [`shopify`] - GraphQL client with retry/backoff and response normalizers
//! - [`catalog`] - cached product reads with a stale fallback
//! - [`stores`] - Shopify cart, offline cart, wishlist and customer session
//! - [`checkout`] - checkout redirect helpers
//! - [`services`] - contact form relay
//! - [`seo_audit`] - SEO presence report for a web project
//!
//! Persistence goes through [`storage`], which replaces browser local storage
//! with one JSON document per key.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod seo_audit;
pub mod services;
pub mod shopify;
pub mod state;
pub mod storage;
pub mod stores;
