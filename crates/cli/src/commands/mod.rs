//! Command implementations.

pub mod account;
pub mod cache;
pub mod cart;
pub mod contact;
pub mod products;
pub mod seo;
pub mod wishlist;

use ankkor_core::ShopifyGid;
use ankkor_storefront::error::AppError;

/// Accept a bare id or a full GID for `resource` and return the full GID.
pub fn gid(resource: &str, input: &str) -> Result<String, AppError> {
    ShopifyGid::from_input(resource, input)
        .map(|gid| gid.to_string())
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
