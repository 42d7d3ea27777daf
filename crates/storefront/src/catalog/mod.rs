//! Product catalog with cache-first reads and stale fallback.
//!
//! Reads go: fresh cache hit, else fetch and store, else (on any failure but
//! `NotFound`) the last cached value regardless of age. With nothing cached
//! the fetch error propagates.

mod cache;

pub use cache::{CacheKey, CacheValue, CatalogCache, DEFAULT_TTL};

use std::future::Future;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::shopify::types::Product;
use crate::shopify::{ShopifyError, StorefrontClient};
use crate::storage::StorageError;

/// Products requested per page when listing the whole catalog.
pub const PAGE_SIZE: i64 = 100;

/// Hard stop on pagination.
pub const MAX_PAGES: usize = 10;

/// Where the catalog fetches products from.
pub trait CatalogSource: Send + Sync {
    /// Every product in the store, in Shopify's order.
    fn fetch_all_products(&self) -> impl Future<Output = Result<Vec<Product>, ShopifyError>> + Send;

    /// One product by handle; `NotFound` when it does not exist.
    fn fetch_product(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Product, ShopifyError>> + Send;
}

impl CatalogSource for StorefrontClient {
    async fn fetch_all_products(&self) -> Result<Vec<Product>, ShopifyError> {
        let mut products = Vec::new();
        let mut after = None;

        for _ in 0..MAX_PAGES {
            let page = self.get_products(PAGE_SIZE, after.take(), None).await?;
            products.extend(page.products);
            if !page.page_info.has_next_page {
                return Ok(products);
            }
            let Some(cursor) = page.page_info.end_cursor else {
                return Ok(products);
            };
            after = Some(cursor);
        }

        warn!(
            count = products.len(),
            max_pages = MAX_PAGES,
            "Stopped paginating products at the page limit"
        );
        Ok(products)
    }

    fn fetch_product(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Product, ShopifyError>> + Send {
        self.get_product_by_handle(handle)
    }
}

/// Cached product catalog.
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    source: S,
    cache: CatalogCache,
}

impl<S: CatalogSource> Catalog<S> {
    #[must_use]
    pub const fn new(source: S, cache: CatalogCache) -> Self {
        Self { source, cache }
    }

    #[must_use]
    pub const fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// All products, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when the fetch fails and nothing is cached.
    #[instrument(skip(self))]
    pub async fn get_all_products(&self) -> Result<Arc<Vec<Product>>, ShopifyError> {
        if let Some(CacheValue::Products(products)) = self.cache.fresh(&CacheKey::Products).await {
            return Ok(products);
        }
        self.refresh_products().await
    }

    /// Refetch the product list, ignoring any fresh cache entry.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when the fetch fails and nothing is cached.
    #[instrument(skip(self))]
    pub async fn refresh_products(&self) -> Result<Arc<Vec<Product>>, ShopifyError> {
        match self.source.fetch_all_products().await {
            Ok(products) => {
                let products = Arc::new(products);
                info!(count = products.len(), "Fetched products");
                self.cache
                    .put(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
                    .await;
                Ok(products)
            }
            Err(e) => match self.cache.stale(&CacheKey::Products).await {
                Some(CacheValue::Products(products)) => {
                    warn!(error = %e, "Product fetch failed, serving cached products");
                    Ok(products)
                }
                _ => Err(e),
            },
        }
    }

    /// One product by handle, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the product does not exist (the cache is not
    /// consulted), or the fetch error when the fetch fails and nothing is
    /// cached.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let key = CacheKey::Product(handle.to_string());
        if let Some(CacheValue::Product(product)) = self.cache.fresh(&key).await {
            return Ok(*product);
        }
        self.refresh_product(handle).await
    }

    /// Refetch one product, ignoring any fresh cache entry.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_product_by_handle`].
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn refresh_product(&self, handle: &str) -> Result<Product, ShopifyError> {
        let key = CacheKey::Product(handle.to_string());
        match self.source.fetch_product(handle).await {
            Ok(product) => {
                self.cache
                    .put(key, CacheValue::Product(Box::new(product.clone())))
                    .await;
                Ok(product)
            }
            Err(e @ ShopifyError::NotFound(_)) => {
                // A deleted product must not keep resurfacing from cache.
                if let Err(storage) = self.cache.invalidate(&key).await {
                    warn!(error = %storage, "Failed to drop cache entry for missing product");
                }
                Err(e)
            }
            Err(e) => match self.cache.stale(&key).await {
                Some(CacheValue::Product(product)) => {
                    warn!(error = %e, "Product fetch failed, serving cached product");
                    Ok(*product)
                }
                _ => Err(e),
            },
        }
    }

    /// Drop a cached product.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted entry cannot be removed.
    pub async fn invalidate_product(&self, handle: &str) -> Result<(), StorageError> {
        self.cache
            .invalidate(&CacheKey::Product(handle.to_string()))
            .await
    }

    /// Drop every cached product and product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store cannot be cleared.
    pub async fn clear(&self) -> Result<usize, StorageError> {
        self.cache.clear().await
    }
}
