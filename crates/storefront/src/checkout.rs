//! Checkout redirect helpers.
//!
//! Checkout always happens on Shopify's hosted page. These helpers only
//! produce the URL to send the shopper to; a missing URL is a hard failure
//! rather than a fallback to some local page.

use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::shopify::types::CartLineInput;
use crate::shopify::{CartBackend, ShopifyError};
use crate::stores::SimpleCartItem;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("No checkout URL available")]
    MissingCheckoutUrl,

    #[error("Invalid checkout URL {url:?}: {source}")]
    InvalidCheckoutUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Shopify(#[from] ShopifyError),
}

/// Resolve a checkout URL.
///
/// # Errors
///
/// `MissingCheckoutUrl` when absent or blank, `InvalidCheckoutUrl` when it
/// does not parse as an absolute URL.
pub fn checkout_url(raw: Option<&str>) -> Result<Url, CheckoutError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CheckoutError::MissingCheckoutUrl)?;

    Url::parse(raw).map_err(|source| CheckoutError::InvalidCheckoutUrl {
        url: raw.to_string(),
        source,
    })
}

/// Turn simple-cart lines into a Shopify cart and return its checkout URL.
///
/// # Errors
///
/// `EmptyCart` when there are no lines with a positive quantity, otherwise
/// whatever creating the cart or resolving its URL fails with.
#[instrument(skip_all, fields(lines = items.len()))]
pub async fn checkout_simple_cart<B: CartBackend>(
    backend: &B,
    items: &[SimpleCartItem],
) -> Result<Url, CheckoutError> {
    let lines: Vec<CartLineInput> = items
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| CartLineInput::new(&item.variant_id, item.quantity))
        .collect();
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let cart = backend.cart_create(lines).await?;
    checkout_url(Some(&cart.checkout_url))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use ankkor_core::{CurrencyCode, Price};
    use rust_decimal::Decimal;

    use super::*;
    use crate::shopify::types::{Cart, CartCost, CartLineUpdateInput};

    #[derive(Default)]
    struct RecordingBackend {
        created: Mutex<Vec<CartLineInput>>,
        checkout_url: String,
    }

    impl CartBackend for RecordingBackend {
        async fn cart_create(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
            self.created.lock().unwrap().extend(lines);
            Ok(Cart {
                id: "gid://shopify/Cart/1".to_string(),
                checkout_url: self.checkout_url.clone(),
                total_quantity: 0,
                note: None,
                cost: CartCost {
                    subtotal: Price::zero(CurrencyCode::default()),
                    total: Price::zero(CurrencyCode::default()),
                    total_tax: None,
                },
                lines: vec![],
            })
        }

        async fn cart_fetch(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
            Err(ShopifyError::NotFound(cart_id.to_string()))
        }

        async fn cart_lines_add(
            &self,
            cart_id: &str,
            _lines: Vec<CartLineInput>,
        ) -> Result<Cart, ShopifyError> {
            Err(ShopifyError::NotFound(cart_id.to_string()))
        }

        async fn cart_lines_update(
            &self,
            cart_id: &str,
            _lines: Vec<CartLineUpdateInput>,
        ) -> Result<Cart, ShopifyError> {
            Err(ShopifyError::NotFound(cart_id.to_string()))
        }

        async fn cart_lines_remove(
            &self,
            cart_id: &str,
            _line_ids: Vec<String>,
        ) -> Result<Cart, ShopifyError> {
            Err(ShopifyError::NotFound(cart_id.to_string()))
        }
    }

    fn simple_item(variant_id: &str, quantity: u32) -> SimpleCartItem {
        SimpleCartItem {
            id: "gid://shopify/Product/1".to_string(),
            variant_id: variant_id.to_string(),
            title: "Linen Shirt".to_string(),
            price: Price::new(Decimal::from(1999), CurrencyCode::default()),
            quantity,
            image_url: None,
            currency_code: CurrencyCode::default(),
        }
    }

    #[test]
    fn test_checkout_url_missing() {
        assert!(matches!(
            checkout_url(None),
            Err(CheckoutError::MissingCheckoutUrl)
        ));
        assert!(matches!(
            checkout_url(Some("   ")),
            Err(CheckoutError::MissingCheckoutUrl)
        ));
    }

    #[test]
    fn test_checkout_url_invalid() {
        let err = checkout_url(Some("/cart/c/1")).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidCheckoutUrl { .. }));
    }

    #[test]
    fn test_checkout_url_valid() {
        let url = checkout_url(Some(" https://ankkor.in/cart/c/abc?key=1 ")).unwrap();
        assert_eq!(url.path(), "/cart/c/abc");
    }

    #[tokio::test]
    async fn test_simple_cart_checkout_creates_cart() {
        let backend = RecordingBackend {
            checkout_url: "https://ankkor.in/cart/c/xyz".to_string(),
            ..RecordingBackend::default()
        };
        let items = [simple_item("v1", 2), simple_item("v2", 0)];

        let url = checkout_simple_cart(&backend, &items).await.unwrap();
        assert_eq!(url.as_str(), "https://ankkor.in/cart/c/xyz");

        let created = backend.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created.first().unwrap().merchandise_id, "v1");
        assert_eq!(created.first().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_simple_cart_checkout_empty() {
        let backend = RecordingBackend::default();
        let err = checkout_simple_cart(&backend, &[]).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_simple_cart_checkout_without_url_fails() {
        let backend = RecordingBackend::default();
        let err = checkout_simple_cart(&backend, &[simple_item("v1", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingCheckoutUrl));
    }
}
