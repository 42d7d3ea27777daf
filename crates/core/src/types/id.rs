//! Shopify global IDs.
//!
//! Storefront API objects are identified by URIs of the form
//! `gid://shopify/<Resource>/<id>`, optionally followed by a query string
//! (cart IDs carry `?key=...`). [`ShopifyGid`] parses and builds them so
//! callers can accept either a bare numeric ID or a full GID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const GID_PREFIX: &str = "gid://shopify/";

/// Error parsing a Shopify GID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GidError {
    #[error("not a Shopify GID: {0}")]
    MissingPrefix(String),
    #[error("GID is missing a resource or id: {0}")]
    Malformed(String),
}

/// A parsed `gid://shopify/<Resource>/<id>` identifier.
///
/// # Example
///
/// ```rust
/// # use ankkor_core::ShopifyGid;
/// let gid: ShopifyGid = "gid://shopify/Product/1".parse().unwrap();
/// assert_eq!(gid.resource(), "Product");
/// assert_eq!(gid.id(), "1");
///
/// let variant = ShopifyGid::from_input("ProductVariant", "42").unwrap();
/// assert_eq!(variant.to_string(), "gid://shopify/ProductVariant/42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShopifyGid {
    resource: String,
    id: String,
    query: Option<String>,
}

impl ShopifyGid {
    /// Build a GID from its parts.
    #[must_use]
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
            query: None,
        }
    }

    /// Accept user input that is either a full GID or a bare id.
    ///
    /// # Errors
    ///
    /// Returns `GidError` if the input looks like a GID but is malformed,
    /// or is empty.
    pub fn from_input(resource: &str, input: &str) -> Result<Self, GidError> {
        let input = input.trim();
        if input.starts_with(GID_PREFIX) {
            return input.parse();
        }
        if input.is_empty() || input.contains('/') {
            return Err(GidError::Malformed(input.to_string()));
        }
        Ok(Self::new(resource, input))
    }

    /// Resource type (e.g., `Product`, `ProductVariant`, `Cart`).
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The resource-local id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The id as a number, when it is one.
    #[must_use]
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

impl FromStr for ShopifyGid {
    type Err = GidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(GID_PREFIX)
            .ok_or_else(|| GidError::MissingPrefix(s.to_string()))?;

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        match path.split_once('/') {
            Some((resource, id)) if !resource.is_empty() && !id.is_empty() && !id.contains('/') => {
                Ok(Self {
                    resource: resource.to_string(),
                    id: id.to_string(),
                    query,
                })
            }
            _ => Err(GidError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for ShopifyGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GID_PREFIX}{}/{}", self.resource, self.id)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ShopifyGid {
    type Error = GidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShopifyGid> for String {
    fn from(gid: ShopifyGid) -> Self {
        gid.to_string()
    }
}
