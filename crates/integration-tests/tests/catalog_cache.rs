//! Catalog pagination, caching and stale fallback over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use ankkor_integration_tests::{
    client, fast_retries, graphql_operation, product_node, products_page,
};
use ankkor_storefront::catalog::{Catalog, CatalogCache};
use ankkor_storefront::shopify::{RetryPolicy, ShopifyError};
use ankkor_storefront::storage::{FileStore, KeyValueStore, MemoryStore};
use serde_json::json;
use wiremock::matchers::body_partial_json;
use wiremock::{MockServer, ResponseTemplate};

fn memory() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

#[tokio::test]
async fn test_all_products_follows_cursors() {
    let server = MockServer::start().await;
    graphql_operation("GetProducts")
        .and(body_partial_json(json!({ "variables": { "after": "page-2" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(
            vec![product_node(3, "silk-tie", "Silk Tie", "899.0")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(
            vec![
                product_node(1, "linen-shirt", "Linen Shirt", "1999.0"),
                product_node(2, "oxford-shirt", "Oxford Shirt", "2499.0"),
            ],
            Some("page-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = Catalog::new(client(&server, fast_retries()), CatalogCache::new(memory()));
    let products = catalog.get_all_products().await.unwrap();

    let handles: Vec<&str> = products.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, ["linen-shirt", "oxford-shirt", "silk-tie"]);
    server.verify().await;
}

#[tokio::test]
async fn test_fresh_cache_skips_network() {
    let server = MockServer::start().await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(
            vec![product_node(1, "linen-shirt", "Linen Shirt", "1999.0")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = Catalog::new(client(&server, fast_retries()), CatalogCache::new(memory()));
    let first = catalog.get_all_products().await.unwrap();
    let second = catalog.get_all_products().await.unwrap();

    assert_eq!(first.len(), second.len());
    server.verify().await;
}

#[tokio::test]
async fn test_refresh_falls_back_to_stale_products() {
    let server = MockServer::start().await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(
            vec![product_node(1, "linen-shirt", "Linen Shirt", "1999.0")],
            None,
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = Catalog::new(client(&server, RetryPolicy::none()), CatalogCache::new(memory()));
    catalog.get_all_products().await.unwrap();

    let products = catalog.refresh_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Linen Shirt");
}

#[tokio::test]
async fn test_persisted_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(
            vec![product_node(1, "linen-shirt", "Linen Shirt", "1999.0")],
            None,
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let catalog = Catalog::new(client(&server, RetryPolicy::none()), CatalogCache::new(store));
        catalog.get_all_products().await.unwrap();
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let catalog = Catalog::new(client(&server, RetryPolicy::none()), CatalogCache::new(store));
    let products = catalog.refresh_products().await.unwrap();
    assert_eq!(products[0].handle, "linen-shirt");
}

#[tokio::test]
async fn test_failure_without_cache_propagates() {
    let server = MockServer::start().await;
    graphql_operation("GetProducts")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = Catalog::new(client(&server, RetryPolicy::none()), CatalogCache::new(memory()));
    let err = catalog.get_all_products().await.unwrap_err();

    assert!(matches!(err, ShopifyError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_deleted_product_is_not_served_from_cache() {
    let server = MockServer::start().await;
    graphql_operation("GetProductByHandle")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "product": product_node(1, "linen-shirt", "Linen Shirt", "1999.0") }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    graphql_operation("GetProductByHandle")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "product": null } })))
        .mount(&server)
        .await;

    let catalog = Catalog::new(client(&server, RetryPolicy::none()), CatalogCache::new(memory()));
    let product = catalog.get_product_by_handle("linen-shirt").await.unwrap();
    assert_eq!(product.material, "Linen");

    let err = catalog.refresh_product("linen-shirt").await.unwrap_err();
    assert!(matches!(err, ShopifyError::NotFound(_)));

    let err = catalog.get_product_by_handle("linen-shirt").await.unwrap_err();
    assert!(matches!(err, ShopifyError::NotFound(_)));
}
