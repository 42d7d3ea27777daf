//! Offline cart for demo mode.
//!
//! Lines are merged by `(id, variant_id)`. Nothing here talks to Shopify
//! until checkout, which turns the lines into a real cart.

use std::sync::Arc;

use ankkor_core::{CurrencyCode, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError, keys, load_state, save_state};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleCartItem {
    /// Product ID.
    pub id: String,
    pub variant_id: String,
    pub title: String,
    /// Unit price.
    pub price: Price,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub currency_code: CurrencyCode,
}

impl SimpleCartItem {
    fn same_line(&self, id: &str, variant_id: &str) -> bool {
        self.id == id && self.variant_id == variant_id
    }
}

/// Client-only cart persisted under `ankkor-simple-cart`.
pub struct SimpleCartStore {
    storage: Arc<dyn KeyValueStore>,
    items: Vec<SimpleCartItem>,
}

impl std::fmt::Debug for SimpleCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleCartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl SimpleCartStore {
    /// Open the store, restoring persisted items.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = load_state(storage.as_ref(), keys::SIMPLE_CART).unwrap_or_default();
        Self { storage, items }
    }

    #[must_use]
    pub fn items(&self) -> &[SimpleCartItem] {
        &self.items
    }

    /// Add an item, merging quantity into an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_item(&mut self, item: SimpleCartItem) -> Result<(), StorageError> {
        if item.quantity == 0 {
            return Ok(());
        }
        match self
            .items
            .iter_mut()
            .find(|existing| existing.same_line(&item.id, &item.variant_id))
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
        self.persist()
    }

    /// Remove a line. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_item(&mut self, id: &str, variant_id: &str) -> Result<bool, StorageError> {
        let before = self.items.len();
        self.items.retain(|i| !i.same_line(id, variant_id));
        let removed = self.items.len() != before;
        self.persist()?;
        Ok(removed)
    }

    /// Set a line's quantity. Zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn update_quantity(
        &mut self,
        id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> Result<(), StorageError> {
        match u32::try_from(quantity) {
            Ok(quantity) if quantity > 0 => {
                if let Some(item) = self.items.iter_mut().find(|i| i.same_line(id, variant_id)) {
                    item.quantity = quantity;
                }
                self.persist()
            }
            _ => self.remove_item(id, variant_id).map(|_| ()),
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.persist()
    }

    /// Total units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, i| total.saturating_add(i.quantity))
    }

    /// Sum of unit price times quantity, in the first line's currency.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map(|i| i.currency_code.clone())
            .unwrap_or_default();
        let amount = self
            .items
            .iter()
            .map(|i| i.price.amount * Decimal::from(i.quantity))
            .sum();
        Price::new(amount, currency)
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_state(self.storage.as_ref(), keys::SIMPLE_CART, &self.items)
    }
}
