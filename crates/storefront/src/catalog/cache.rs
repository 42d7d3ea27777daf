//! Two-tier product cache.
//!
//! A `moka` cache fronts the persistent store within a process. The
//! persistent tier keeps `{"timestamp": ..., "data": ...}` entries that are
//! fresh for the TTL and remain readable afterwards as a stale fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::shopify::types::Product;
use crate::storage::{KeyValueStore, StorageError, get_json, keys, set_json};

/// How long a cached entry counts as fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache key for products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// The full product list.
    Products,
    /// A single product by handle.
    Product(String),
}

impl CacheKey {
    /// Key used in the persistent store.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Products => keys::PRODUCTS_CACHE.to_string(),
            Self::Product(handle) => keys::product_cache(handle),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}

impl CacheValue {
    fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Products(products) => serde_json::to_value(products.as_ref()),
            Self::Product(product) => serde_json::to_value(product.as_ref()),
        }
    }

    fn from_json(key: &CacheKey, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match key {
            CacheKey::Products => Self::Products(Arc::new(serde_json::from_value(data)?)),
            CacheKey::Product(_) => Self::Product(Box::new(serde_json::from_value(data)?)),
        })
    }
}

/// Persisted cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    timestamp: DateTime<Utc>,
    data: Value,
}

/// Product cache with an in-memory tier and a persistent tier.
#[derive(Clone)]
pub struct CatalogCache {
    memory: Cache<CacheKey, CacheValue>,
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("entry_count", &self.memory.entry_count())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CatalogCache {
    /// Create a cache over `store` with the default 5-minute TTL.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    #[must_use]
    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        let memory = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { memory, store, ttl }
    }

    /// A value younger than the TTL, if any.
    pub async fn fresh(&self, key: &CacheKey) -> Option<CacheValue> {
        if let Some(value) = self.memory.get(key).await {
            debug!(?key, "Memory cache hit");
            return Some(value);
        }

        let entry = self.read_entry(key)?;
        if !self.is_fresh(entry.timestamp) {
            return None;
        }
        let value = decode(key, entry.data)?;
        debug!(?key, "Persistent cache hit");
        self.memory.insert(key.clone(), value.clone()).await;
        Some(value)
    }

    /// The persisted value regardless of age.
    pub async fn stale(&self, key: &CacheKey) -> Option<CacheValue> {
        if let Some(value) = self.memory.get(key).await {
            return Some(value);
        }
        let entry = self.read_entry(key)?;
        decode(key, entry.data)
    }

    /// Store a value in both tiers. Persistence failures are logged, not
    /// returned, so a read-only data directory does not break browsing.
    pub async fn put(&self, key: CacheKey, value: CacheValue) {
        if let Err(e) = self.write_entry(&key, &value) {
            warn!(?key, error = %e, "Failed to persist cache entry");
        }
        self.memory.insert(key, value).await;
    }

    /// Drop one entry from both tiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent entry cannot be removed.
    pub async fn invalidate(&self, key: &CacheKey) -> Result<(), StorageError> {
        self.memory.invalidate(key).await;
        self.store.remove(&key.storage_key())?;
        Ok(())
    }

    /// Drop every product entry from both tiers. Returns how many persisted
    /// entries were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store cannot be listed or written.
    pub async fn clear(&self) -> Result<usize, StorageError> {
        self.memory.invalidate_all();
        self.memory.run_pending_tasks().await;

        let mut removed = 0;
        for key in self.store.keys()? {
            if is_cache_key(&key) && self.store.remove(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Entries stamped in the future (clock skew) count as stale.
    fn is_fresh(&self, timestamp: DateTime<Utc>) -> bool {
        let age = Utc::now().signed_duration_since(timestamp);
        age.to_std().is_ok_and(|age| age < self.ttl)
    }

    fn read_entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        match get_json::<CacheEntry>(self.store.as_ref(), &key.storage_key()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(?key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    fn write_entry(&self, key: &CacheKey, value: &CacheValue) -> Result<(), StorageError> {
        let entry = CacheEntry {
            timestamp: Utc::now(),
            data: value.to_json()?,
        };
        set_json(self.store.as_ref(), &key.storage_key(), &entry)
    }
}

fn decode(key: &CacheKey, data: Value) -> Option<CacheValue> {
    CacheValue::from_json(key, data)
        .map_err(|e| warn!(?key, error = %e, "Ignoring cache entry with unexpected shape"))
        .ok()
}

fn is_cache_key(key: &str) -> bool {
    key == keys::PRODUCTS_CACHE
        || (key.starts_with(keys::PRODUCT_CACHE_PREFIX)
            && key.ends_with(keys::PRODUCT_CACHE_SUFFIX))
}

/// Write an entry that was cached `age` ago.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn write_aged_entry(
    store: &dyn KeyValueStore,
    key: &CacheKey,
    data: Value,
    age: chrono::Duration,
) {
    let entry = CacheEntry {
        timestamp: Utc::now() - age,
        data,
    };
    set_json(store, &key.storage_key(), &entry).unwrap();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_storage_keys() {
        assert_eq!(CacheKey::Products.storage_key(), "ankkor_products_cache");
        assert_eq!(
            CacheKey::Product("linen-shirt".to_string()).storage_key(),
            "ankkor_product_linen-shirt_cache"
        );
    }

    #[test]
    fn test_is_cache_key() {
        assert!(is_cache_key("ankkor_products_cache"));
        assert!(is_cache_key("ankkor_product_linen-shirt_cache"));
        assert!(!is_cache_key("ankkor-cart"));
        assert!(!is_cache_key("ankkor-wishlist"));
    }

    #[tokio::test]
    async fn test_put_then_fresh() {
        let store = Arc::new(MemoryStore::new());
        let cache = CatalogCache::new(store.clone());
        cache
            .put(CacheKey::Products, CacheValue::Products(Arc::new(vec![])))
            .await;

        assert!(matches!(
            cache.fresh(&CacheKey::Products).await,
            Some(CacheValue::Products(_))
        ));
        let raw = store.get("ankkor_products_cache").unwrap().unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert!(json["timestamp"].is_string());
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_expired_entry_is_stale_but_not_fresh() {
        let store = Arc::new(MemoryStore::new());
        write_aged_entry(
            store.as_ref(),
            &CacheKey::Products,
            serde_json::json!([]),
            chrono::Duration::minutes(10),
        );
        let cache = CatalogCache::new(store);

        assert!(cache.fresh(&CacheKey::Products).await.is_none());
        assert!(cache.stale(&CacheKey::Products).await.is_some());
    }

    #[tokio::test]
    async fn test_future_timestamp_is_not_fresh() {
        let store = Arc::new(MemoryStore::new());
        write_aged_entry(
            store.as_ref(),
            &CacheKey::Products,
            serde_json::json!([]),
            chrono::Duration::hours(-1),
        );
        let cache = CatalogCache::new(store);

        assert!(cache.fresh(&CacheKey::Products).await.is_none());
        assert!(cache.stale(&CacheKey::Products).await.is_some());
    }

    #[tokio::test]
    async fn test_clear_keeps_store_state() {
        let store = Arc::new(MemoryStore::new());
        store.set("ankkor-cart", "{}").unwrap();
        write_aged_entry(
            store.as_ref(),
            &CacheKey::Products,
            serde_json::json!([]),
            chrono::Duration::zero(),
        );
        let cache = CatalogCache::new(store.clone());

        assert_eq!(cache.clear().await.unwrap(), 1);
        assert!(store.get("ankkor-cart").unwrap().is_some());
        assert!(cache.stale(&CacheKey::Products).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_entry_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.set("ankkor_products_cache", "[1, 2").unwrap();
        let cache = CatalogCache::new(store);
        assert!(cache.stale(&CacheKey::Products).await.is_none());
    }
}
