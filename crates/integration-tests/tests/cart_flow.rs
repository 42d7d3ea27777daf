//! Shopify-backed cart store driven against a mock Storefront API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use ankkor_integration_tests::{cart_node, cart_payload, client, fast_retries, graphql_operation};
use ankkor_storefront::shopify::{RetryPolicy, StorefrontClient};
use ankkor_storefront::storage::{KeyValueStore, MemoryStore};
use ankkor_storefront::stores::CartStore;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::body_partial_json;
use wiremock::{MockServer, ResponseTemplate};

const CART_ID: &str = "gid://shopify/Cart/abc123";
const LINE_ID: &str = "gid://shopify/CartLine/1";
const VARIANT_ID: &str = "gid://shopify/ProductVariant/10";

fn store(server: &MockServer, storage: &Arc<dyn KeyValueStore>) -> CartStore<StorefrontClient> {
    CartStore::new(client(server, fast_retries()), Arc::clone(storage))
}

#[tokio::test]
async fn test_add_then_update_to_zero_empties_cart() {
    let server = MockServer::start().await;
    graphql_operation("CreateCart")
        .and(body_partial_json(json!({
            "variables": { "input": { "lines": [{ "merchandiseId": VARIANT_ID, "quantity": 2 }] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_payload(
            "cartCreate",
            cart_node(CART_ID, &[(LINE_ID, VARIANT_ID, 2)]),
        )))
        .expect(1)
        .mount(&server)
        .await;
    graphql_operation("RemoveFromCart")
        .and(body_partial_json(json!({
            "variables": { "cartId": CART_ID, "lineIds": [LINE_ID] }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_payload("cartLinesRemove", cart_node(CART_ID, &[]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let cart = store(&server, &storage);

    let state = cart.add_item(VARIANT_ID, 2).await.unwrap();
    assert_eq!(state.cart_id.as_deref(), Some(CART_ID));
    assert_eq!(state.item_count, 2);
    assert_eq!(state.items[0].id, LINE_ID);
    assert_eq!(state.subtotal.amount, Decimal::new(3998, 0));

    let state = cart.update_item(LINE_ID, 0).await.unwrap();
    assert!(state.items.is_empty());
    assert_eq!(state.item_count, 0);
    assert!(!cart.is_loading().await);
    server.verify().await;
}

#[tokio::test]
async fn test_persisted_cart_is_resumed() {
    let server = MockServer::start().await;
    graphql_operation("CreateCart")
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_payload(
            "cartCreate",
            cart_node(CART_ID, &[(LINE_ID, VARIANT_ID, 1)]),
        )))
        .expect(1)
        .mount(&server)
        .await;
    graphql_operation("GetCart")
        .and(body_partial_json(json!({ "variables": { "cartId": CART_ID } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "cart": cart_node(CART_ID, &[(LINE_ID, VARIANT_ID, 1)]) }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store(&server, &storage).add_item(VARIANT_ID, 1).await.unwrap();

    let resumed = store(&server, &storage);
    assert_eq!(resumed.item_count().await, 1);

    let state = resumed.init().await.unwrap();
    assert_eq!(state.cart_id.as_deref(), Some(CART_ID));
    assert_eq!(
        resumed.checkout_url().await.unwrap().as_str(),
        "https://ankkor.myshopify.com/cart/c/test"
    );
    server.verify().await;
}

#[tokio::test]
async fn test_expired_cart_is_replaced() {
    let server = MockServer::start().await;
    graphql_operation("CreateCart")
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_payload(
            "cartCreate",
            cart_node(CART_ID, &[(LINE_ID, VARIANT_ID, 1)]),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    graphql_operation("GetCart")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "cart": null } })))
        .expect(1)
        .mount(&server)
        .await;
    graphql_operation("CreateCart")
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_payload(
            "cartCreate",
            cart_node("gid://shopify/Cart/fresh", &[]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store(&server, &storage).add_item(VARIANT_ID, 1).await.unwrap();

    let state = store(&server, &storage).init().await.unwrap();
    assert_eq!(state.cart_id.as_deref(), Some("gid://shopify/Cart/fresh"));
    assert!(state.items.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_user_errors_leave_cart_untouched() {
    let server = MockServer::start().await;
    graphql_operation("CreateCart")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "cartCreate": {
                    "cart": null,
                    "userErrors": [{ "field": ["lines"], "message": "Variant is sold out" }]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let cart = CartStore::new(client(&server, RetryPolicy::none()), Arc::clone(&storage));

    let err = cart.add_item(VARIANT_ID, 1).await.unwrap_err();
    assert!(err.to_string().contains("sold out"));

    let state = cart.snapshot().await;
    assert!(state.cart_id.is_none());
    assert!(!state.is_loading);
    server.verify().await;
}
