//! Shopify-backed cart store.
//!
//! Each mutation ensures a server cart exists, calls the mutation, then
//! replaces local items and totals with the cart Shopify returns. There are
//! no optimistic updates and no retries at this layer. Concurrent mutations
//! are not serialized: the state lock is released before any network call,
//! so the last response to arrive wins.

use std::future::Future;
use std::sync::Arc;

use ankkor_core::{CurrencyCode, Price};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use url::Url;

use crate::checkout::{CheckoutError, checkout_url};
use crate::shopify::types::{Cart, CartLine, CartLineInput, CartLineUpdateInput};
use crate::shopify::{CartBackend, ShopifyError};
use crate::storage::{KeyValueStore, keys, load_state, save_state};

/// A cart line as the store presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line ID.
    pub id: String,
    pub variant_id: String,
    pub product_id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: String,
    /// Unit price.
    pub price: Price,
    pub quantity: u32,
    pub currency_code: CurrencyCode,
    pub image_url: Option<String>,
}

impl From<&CartLine> for CartItem {
    fn from(line: &CartLine) -> Self {
        let merchandise = &line.merchandise;
        Self {
            id: line.id.clone(),
            variant_id: merchandise.id.clone(),
            product_id: merchandise.product.id.clone(),
            handle: merchandise.product.handle.clone(),
            title: merchandise.product.title.clone(),
            variant_title: merchandise.title.clone(),
            price: line.amount_per_quantity.clone(),
            quantity: line.quantity,
            currency_code: line.amount_per_quantity.currency_code.clone(),
            image_url: merchandise.image.as_ref().map(|i| i.url.clone()),
        }
    }
}

/// Local mirror of the server cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub cart_id: Option<String>,
    pub checkout_url: Option<String>,
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: Price,
    pub currency_code: CurrencyCode,
    /// Set while a cart call is in flight; never persisted.
    #[serde(skip)]
    pub is_loading: bool,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            cart_id: None,
            checkout_url: None,
            items: Vec::new(),
            item_count: 0,
            subtotal: Price::zero(CurrencyCode::default()),
            currency_code: CurrencyCode::default(),
            is_loading: false,
        }
    }
}

impl CartState {
    fn replace_with(&mut self, cart: &Cart) {
        self.cart_id = Some(cart.id.clone());
        self.checkout_url = Some(cart.checkout_url.clone()).filter(|u| !u.is_empty());
        self.items = cart.lines.iter().map(CartItem::from).collect();
        self.item_count = cart.total_quantity;
        self.subtotal = cart.cost.subtotal.clone();
        self.currency_code = cart.cost.subtotal.currency_code.clone();
    }

    /// Find the line holding a variant.
    #[must_use]
    pub fn item_for_variant(&self, variant_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.variant_id == variant_id)
    }
}

/// Cart store over a [`CartBackend`].
pub struct CartStore<B> {
    backend: B,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<CartState>,
}

impl<B> std::fmt::Debug for CartStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

impl<B: CartBackend> CartStore<B> {
    /// Create a store, restoring any persisted state.
    pub fn new(backend: B, storage: Arc<dyn KeyValueStore>) -> Self {
        let state = load_state::<CartState>(storage.as_ref(), keys::CART).unwrap_or_default();
        Self {
            backend,
            storage,
            state: RwLock::new(state),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> CartState {
        self.state.read().await.clone()
    }

    pub async fn item_count(&self) -> u32 {
        self.state.read().await.item_count
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    /// Validated checkout URL for the current cart.
    ///
    /// # Errors
    ///
    /// Returns `MissingCheckoutUrl` before a cart exists, or
    /// `InvalidCheckoutUrl` if Shopify sent something unparsable.
    pub async fn checkout_url(&self) -> Result<Url, CheckoutError> {
        let state = self.state.read().await;
        checkout_url(state.checkout_url.as_deref())
    }

    /// Sync with the server copy of the persisted cart.
    ///
    /// Without a persisted cart nothing is fetched; a cart is created on the
    /// first mutation. A persisted cart Shopify no longer knows is replaced
    /// by a new empty one.
    ///
    /// # Errors
    ///
    /// Returns the backend error for anything other than an unknown cart.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<CartState, ShopifyError> {
        let Some(cart_id) = self.cart_id().await else {
            return Ok(self.snapshot().await);
        };

        self.track(async {
            match self.backend.cart_fetch(&cart_id).await {
                Ok(cart) => Ok(cart),
                Err(ShopifyError::NotFound(_)) => {
                    warn!(cart_id = %cart_id, "Persisted cart no longer exists, creating a new one");
                    self.backend.cart_create(Vec::new()).await
                }
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Add `quantity` of a variant. A zero quantity changes nothing.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add_item(&self, variant_id: &str, quantity: u32) -> Result<CartState, ShopifyError> {
        if quantity == 0 {
            return Ok(self.snapshot().await);
        }
        let lines = vec![CartLineInput::new(variant_id, quantity)];

        self.track(async {
            match self.cart_id().await {
                Some(cart_id) => self.backend.cart_lines_add(&cart_id, lines).await,
                None => self.backend.cart_create(lines).await,
            }
        })
        .await
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_item(&self, line_id: &str, quantity: i64) -> Result<CartState, ShopifyError> {
        let Ok(quantity) = u32::try_from(quantity) else {
            return self.remove_item(line_id).await;
        };
        if quantity == 0 {
            return self.remove_item(line_id).await;
        }
        let lines = vec![CartLineUpdateInput {
            id: line_id.to_string(),
            quantity,
        }];

        self.track(async {
            let cart_id = self.ensure_cart().await?;
            self.backend.cart_lines_update(&cart_id, lines).await
        })
        .await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: &str) -> Result<CartState, ShopifyError> {
        let line_ids = vec![line_id.to_string()];

        self.track(async {
            let cart_id = self.ensure_cart().await?;
            self.backend.cart_lines_remove(&cart_id, line_ids).await
        })
        .await
    }

    /// Replace the cart with a new empty one.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartState, ShopifyError> {
        self.track(self.backend.cart_create(Vec::new())).await
    }

    async fn cart_id(&self) -> Option<String> {
        self.state.read().await.cart_id.clone()
    }

    /// Current cart ID, creating an empty server cart when there is none.
    async fn ensure_cart(&self) -> Result<String, ShopifyError> {
        if let Some(cart_id) = self.cart_id().await {
            return Ok(cart_id);
        }
        let cart = self.backend.cart_create(Vec::new()).await?;
        info!(cart_id = %cart.id, "Created cart");
        let cart_id = cart.id.clone();
        self.apply(&cart).await;
        Ok(cart_id)
    }

    /// Run a backend call with `is_loading` raised, then adopt its cart.
    async fn track<F>(&self, call: F) -> Result<CartState, ShopifyError>
    where
        F: Future<Output = Result<Cart, ShopifyError>>,
    {
        self.state.write().await.is_loading = true;
        let result = call.await;

        match result {
            Ok(cart) => Ok(self.apply(&cart).await),
            Err(e) => {
                self.state.write().await.is_loading = false;
                Err(e)
            }
        }
    }

    /// Adopt a server cart, clear `is_loading` and persist.
    async fn apply(&self, cart: &Cart) -> CartState {
        let snapshot = {
            let mut state = self.state.write().await;
            state.replace_with(cart);
            state.is_loading = false;
            state.clone()
        };
        if let Err(e) = save_state(self.storage.as_ref(), keys::CART, &snapshot) {
            warn!(error = %e, "Failed to persist cart");
        }
        snapshot
    }
}
