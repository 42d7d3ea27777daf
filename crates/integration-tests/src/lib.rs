//! Shared fixtures for the Ankkor integration tests.
//!
//! Every test stands up a `wiremock` server in place of the Shopify
//! Storefront API (or EmailJS), so no real network traffic is made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ankkor-integration-tests
//! ```

use std::time::Duration;

use ankkor_storefront::shopify::{RetryPolicy, StorefrontClient};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockBuilder, MockServer};

/// GraphQL path the test clients post to.
pub const GRAPHQL_PATH: &str = "/api/2025-01/graphql.json";

/// Access token the test clients send.
pub const TEST_TOKEN: &str = "test-storefront-token";

/// Retry policy with the production attempt count but no waiting.
#[must_use]
pub const fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        jitter: false,
    }
}

/// Build a client against the mock server.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client(server: &MockServer, retry: RetryPolicy) -> StorefrontClient {
    StorefrontClient::with_endpoint(
        format!("{}{GRAPHQL_PATH}", server.uri()),
        SecretString::from(TEST_TOKEN.to_string()),
        retry,
    )
    .unwrap_or_else(|e| panic!("failed to build test client: {e}"))
}

/// Match a POST of the named GraphQL operation.
#[must_use]
pub fn graphql_operation(operation: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "operationName": operation })))
}

/// A money object.
#[must_use]
pub fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "INR" })
}

/// A complete product node.
#[must_use]
pub fn product_node(id: u32, handle: &str, title: &str, price: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{id}"),
        "handle": handle,
        "title": title,
        "description": "Breathable everyday shirt",
        "descriptionHtml": "<p>Breathable everyday shirt</p>",
        "availableForSale": true,
        "productType": "Shirts",
        "vendor": "Ankkor",
        "tags": ["linen"],
        "featuredImage": {
            "id": format!("gid://shopify/ProductImage/{id}"),
            "url": format!("https://cdn.shopify.com/{handle}.jpg"),
            "altText": title,
            "width": 800,
            "height": 1000
        },
        "images": { "edges": [] },
        "options": [{ "id": "gid://shopify/ProductOption/1", "name": "Size", "values": ["M"] }],
        "variants": {
            "edges": [{
                "cursor": "v1",
                "node": {
                    "id": format!("gid://shopify/ProductVariant/{id}0"),
                    "title": "M",
                    "availableForSale": true,
                    "quantityAvailable": 5,
                    "sku": format!("SKU-{id}"),
                    "price": money(price),
                    "compareAtPrice": null,
                    "selectedOptions": [{ "name": "Size", "value": "M" }],
                    "image": null
                }
            }]
        },
        "collections": { "edges": [] },
        "priceRange": {
            "minVariantPrice": money(price),
            "maxVariantPrice": money(price)
        },
        "metafields": [
            { "namespace": "custom", "key": "material", "value": "Linen" }
        ]
    })
}

/// A `GetProducts` response body.
#[must_use]
pub fn products_page(nodes: Vec<Value>, end_cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| json!({ "cursor": format!("c{i}"), "node": node }))
        .collect();
    json!({
        "data": {
            "products": {
                "edges": edges,
                "pageInfo": {
                    "hasNextPage": end_cursor.is_some(),
                    "hasPreviousPage": false,
                    "startCursor": null,
                    "endCursor": end_cursor
                }
            }
        }
    })
}

/// A cart with the given `(line id, variant id, quantity)` lines at 1999 each.
#[must_use]
pub fn cart_node(cart_id: &str, lines: &[(&str, &str, u32)]) -> Value {
    let edges: Vec<Value> = lines
        .iter()
        .map(|(line_id, variant_id, quantity)| {
            json!({
                "node": {
                    "id": line_id,
                    "quantity": quantity,
                    "cost": {
                        "amountPerQuantity": money("1999.0"),
                        "totalAmount": money(&format!("{}.0", 1999 * quantity))
                    },
                    "merchandise": {
                        "id": variant_id,
                        "title": "M",
                        "price": money("1999.0"),
                        "selectedOptions": [{ "name": "Size", "value": "M" }],
                        "image": null,
                        "product": {
                            "id": "gid://shopify/Product/1",
                            "handle": "linen-shirt",
                            "title": "Linen Shirt"
                        }
                    }
                }
            })
        })
        .collect();
    let total_quantity: u32 = lines.iter().map(|(_, _, q)| q).sum();
    let subtotal = format!("{}.0", 1999 * total_quantity);

    json!({
        "id": cart_id,
        "checkoutUrl": "https://ankkor.myshopify.com/cart/c/test",
        "totalQuantity": total_quantity,
        "note": null,
        "cost": {
            "subtotalAmount": money(&subtotal),
            "totalAmount": money(&subtotal),
            "totalTaxAmount": null
        },
        "lines": { "edges": edges }
    })
}

/// A cart mutation response body.
#[must_use]
pub fn cart_payload(field: &str, cart: Value) -> Value {
    json!({ "data": { field: { "cart": cart, "userErrors": [] } } })
}

/// A response body carrying only GraphQL errors.
#[must_use]
pub fn graphql_errors(message: &str, code: Option<&str>) -> Value {
    let mut error = json!({ "message": message });
    if let Some(code) = code {
        error["extensions"] = json!({ "code": code });
    }
    json!({ "errors": [error] })
}
