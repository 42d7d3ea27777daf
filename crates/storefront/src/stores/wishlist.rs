//! Client-only wishlist, unique by product ID.

use std::sync::Arc;

use ankkor_core::Price;
use serde::{Deserialize, Serialize};

use crate::shopify::types::Product;
use crate::storage::{KeyValueStore, StorageError, keys, load_state, save_state};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Product ID.
    pub id: String,
    pub title: String,
    pub handle: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub material: String,
}

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            handle: product.handle.clone(),
            price: product.price().clone(),
            image_url: Some(product.featured_image.url.clone()),
            material: product.material.clone(),
        }
    }
}

/// Wishlist persisted under `ankkor-wishlist`.
pub struct WishlistStore {
    storage: Arc<dyn KeyValueStore>,
    items: Vec<WishlistItem>,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl WishlistStore {
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = load_state(storage.as_ref(), keys::WISHLIST).unwrap_or_default();
        Self { storage, items }
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Add an item unless one with the same ID is already present. Returns
    /// whether it was added.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    pub fn add(&mut self, item: WishlistItem) -> Result<bool, StorageError> {
        if self.contains(&item.id) {
            return Ok(false);
        }
        self.items.push(item);
        self.persist()?;
        Ok(true)
    }

    /// Remove by ID. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    pub fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_state(self.storage.as_ref(), keys::WISHLIST, &self.items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ankkor_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn item(id: &str) -> WishlistItem {
        WishlistItem {
            id: id.to_string(),
            title: "Linen Shirt".to_string(),
            handle: "linen-shirt".to_string(),
            price: Price::new(Decimal::from(2499), CurrencyCode::default()),
            image_url: None,
            material: "Linen".to_string(),
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = WishlistStore::load(Arc::new(MemoryStore::new()));
        assert!(wishlist.add(item("p1")).unwrap());
        assert!(!wishlist.add(item("p1")).unwrap());
        assert_eq!(wishlist.items().len(), 1);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut wishlist = WishlistStore::load(Arc::new(MemoryStore::new()));
        wishlist.add(item("p1")).unwrap();
        assert!(wishlist.contains("p1"));
        assert!(wishlist.remove("p1").unwrap());
        assert!(!wishlist.contains("p1"));
        assert!(!wishlist.remove("p1").unwrap());
    }

    #[test]
    fn test_persists_across_loads() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut wishlist = WishlistStore::load(Arc::clone(&storage));
        wishlist.add(item("p1")).unwrap();
        wishlist.add(item("p2")).unwrap();

        let reloaded = WishlistStore::load(Arc::clone(&storage));
        assert_eq!(reloaded.items().len(), 2);

        let mut reloaded = reloaded;
        reloaded.clear().unwrap();
        assert!(WishlistStore::load(storage).items().is_empty());
    }
}
