//! Application state shared by every command.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogCache};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::{ContactError, EmailJsClient};
use crate::shopify::StorefrontClient;
use crate::storage::{FileStore, KeyValueStore};
use crate::stores::{CartStore, CustomerSessionStore, SimpleCartStore, WishlistStore};

/// Application state.
///
/// Cheaply cloneable via `Arc`. Owns the Shopify client, the persistent
/// store, the cached catalog and the Shopify-backed cart. The synchronous
/// stores are loaded on demand from the same persistent store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    storage: Arc<dyn KeyValueStore>,
    catalog: Catalog<StorefrontClient>,
    cart: CartStore<StorefrontClient>,
    contact: Option<EmailJsClient>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("storefront", &self.inner.storefront)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state with a file store under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or a client
    /// fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.data_dir)?);
        let storefront = StorefrontClient::new(&config.shopify)?;
        Self::with_parts(config, storefront, storage)
    }

    /// Build state from an existing client and store.
    ///
    /// # Errors
    ///
    /// Returns an error if the contact relay client fails to build.
    pub fn with_parts(
        config: StorefrontConfig,
        storefront: StorefrontClient,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let catalog = Catalog::new(
            storefront.clone(),
            CatalogCache::new(Arc::clone(&storage)),
        );
        let cart = CartStore::new(storefront.clone(), Arc::clone(&storage));
        let contact = config
            .emailjs
            .clone()
            .map(EmailJsClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                storage,
                catalog,
                cart,
                contact,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog<StorefrontClient> {
        &self.inner.catalog
    }

    /// The Shopify-backed cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore<StorefrontClient> {
        &self.inner.cart
    }

    #[must_use]
    pub fn simple_cart(&self) -> SimpleCartStore {
        SimpleCartStore::load(Arc::clone(&self.inner.storage))
    }

    #[must_use]
    pub fn wishlist(&self) -> WishlistStore {
        WishlistStore::load(Arc::clone(&self.inner.storage))
    }

    #[must_use]
    pub fn customer_session(&self) -> CustomerSessionStore {
        CustomerSessionStore::load(Arc::clone(&self.inner.storage))
    }

    /// The contact relay.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when the EmailJS keys are absent.
    pub fn contact(&self) -> Result<&EmailJsClient, ContactError> {
        self.inner.contact.as_ref().ok_or(ContactError::NotConfigured)
    }
}
