//! Persistent key-value storage for client state.
//!
//! Stores and the catalog cache persist through [`KeyValueStore`], which
//! holds one JSON document per key. [`FileStore`] writes them under the data
//! directory; [`MemoryStore`] keeps them in process for tests and dry runs.
//!
//! Store state is wrapped in a versioned envelope (`{"state": ..., "version":
//! 1}`). An envelope that fails to parse, or carries another version, is
//! discarded and the store starts empty.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Persistence keys used across the crate.
pub mod keys {
    /// Shopify-backed cart state.
    pub const CART: &str = "ankkor-cart";
    /// Offline simple cart state.
    pub const SIMPLE_CART: &str = "ankkor-simple-cart";
    /// Wishlist state.
    pub const WISHLIST: &str = "ankkor-wishlist";
    /// Signed-in customer session.
    pub const CUSTOMER_TOKEN: &str = "ankkor-customer-token";
    /// Cached product list.
    pub const PRODUCTS_CACHE: &str = "ankkor_products_cache";
    /// Prefix of per-handle product cache keys.
    pub const PRODUCT_CACHE_PREFIX: &str = "ankkor_product_";
    /// Suffix of per-handle product cache keys.
    pub const PRODUCT_CACHE_SUFFIX: &str = "_cache";

    /// Cache key for a single product.
    #[must_use]
    pub fn product_cache(handle: &str) -> String {
        format!("{PRODUCT_CACHE_PREFIX}{handle}{PRODUCT_CACHE_SUFFIX}")
    }
}

/// Version written into every persisted store envelope.
pub const STORE_VERSION: u32 = 1;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// String-keyed document store.
///
/// Implementations must be safe to share between tasks. Values are opaque
/// JSON text; typed access goes through [`get_json`] and [`set_json`].
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be listed.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Read and deserialize a JSON value.
///
/// # Errors
///
/// Returns an error if the store fails or the stored text is not valid JSON
/// for `T`.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(StorageError::from)
}

/// Serialize and write a JSON value.
///
/// # Errors
///
/// Returns an error if serialization or the store fails.
pub fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(value)?;
    store.set(key, &text)
}

/// Versioned wrapper around persisted store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persisted<T> {
    pub state: T,
    pub version: u32,
}

/// Load store state, discarding anything unreadable or from another version.
pub fn load_state<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match get_json::<Persisted<T>>(store, key) {
        Ok(Some(envelope)) if envelope.version == STORE_VERSION => Some(envelope.state),
        Ok(Some(envelope)) => {
            warn!(key, version = envelope.version, "Discarding persisted state with unknown version");
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable persisted state");
            None
        }
    }
}

/// Persist store state in the current envelope version.
///
/// # Errors
///
/// Returns an error if serialization or the store fails.
pub fn save_state<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    state: &T,
) -> Result<(), StorageError> {
    set_json(
        store,
        key,
        &Persisted {
            state,
            version: STORE_VERSION,
        },
    )
}
