//! Shopify Storefront API client implementation.
//!
//! Sends hand-written GraphQL documents through `graphql_client`'s request
//! envelope with `reqwest` 0.13. Transient failures are retried according to
//! the client's [`RetryPolicy`]. Nothing is cached here; see
//! [`crate::catalog`] for the product cache.

mod conversions;
mod queries;
mod raw;
pub mod retry;

pub use conversions::PLACEHOLDER_IMAGE_URL;
pub use conversions::metafields::flatten_metafields;
pub use conversions::products::{DEFAULT_MATERIAL, DEFAULT_VARIANT_TITLE};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    Cart, CartLineInput, CartLineUpdateInput, Collection, Customer, CustomerAccessToken,
    CustomerCreateInput, Product, ProductConnection,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use conversions::{
    convert_access_token, convert_cart, convert_collection, convert_customer, convert_product,
    convert_product_connection, join_user_errors,
};
use queries::{
    AddToCart, CreateCart, CustomerAccessTokenCreate, CustomerCreate, GetCart,
    GetCollectionByHandle, GetCustomer, GetProductByHandle, GetProducts, RemoveFromCart,
    UpdateCartLines, add_to_cart, create_cart, customer_access_token_create, customer_create,
    get_cart, get_collection_by_handle, get_customer, get_product_by_handle, get_products,
    remove_from_cart, update_cart_lines,
};
use raw::RawCartPayload;
use retry::{RetryPolicy, retry_with_backoff};

/// Header carrying the public Storefront access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response bodies are truncated to this many characters in logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// CartBackend
// =============================================================================

/// The cart mutations the cart store depends on.
///
/// [`StorefrontClient`] is the production implementation; tests substitute
/// an in-memory fake.
pub trait CartBackend: Send + Sync {
    fn cart_create(
        &self,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn cart_fetch(&self, cart_id: &str) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn cart_lines_add(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn cart_lines_update(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn cart_lines_remove(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    retry: RetryPolicy,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .field("retry", &self.inner.retry)
            .finish()
    }
}

impl StorefrontClient {
    /// Create a client for the configured store with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        Self::with_endpoint(
            config.endpoint(),
            config.access_token.clone(),
            RetryPolicy::default(),
        )
    }

    /// Create a client against an explicit GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        access_token: SecretString,
        retry: RetryPolicy,
    ) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: endpoint.into(),
                access_token,
                retry,
            }),
        })
    }

    /// GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation, retrying transient failures.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;
        let payload = serde_json::to_vec(&request_body)?;

        retry_with_backoff(&self.inner.retry, || {
            self.send_once::<Q>(operation, &payload)
        })
        .await
    }

    /// One HTTP round trip, classified into a [`ShopifyError`] on failure.
    async fn send_once<Q: GraphQLQuery>(
        &self,
        operation: &str,
        payload: &[u8],
    ) -> Result<Q::ResponseData, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(ShopifyError::RateLimited { retry_after });
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                operation,
                status = %status,
                body = %truncate(&response_text, LOG_BODY_LIMIT),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                message: truncate(&response_text, 200),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation,
                    error = %e,
                    body = %truncate(&response_text, LOG_BODY_LIMIT),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation, errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation,
                body = %truncate(&response_text, LOG_BODY_LIMIT),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::graphql_message("No data in response")
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: i64,
        after: Option<String>,
        query: Option<String>,
    ) -> Result<ProductConnection, ShopifyError> {
        let variables = get_products::Variables {
            first,
            after,
            query,
        };

        let data = self.execute::<GetProducts>(variables).await?;

        data.products
            .map(convert_product_connection)
            .ok_or_else(|| ShopifyError::graphql_message("Missing products connection"))
    }

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has this handle, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let variables = get_product_by_handle::Variables {
            handle: handle.to_string(),
        };

        let data = self.execute::<GetProductByHandle>(variables).await?;

        data.product
            .and_then(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection and its first `first` products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection does not exist, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_by_handle(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Collection, ShopifyError> {
        let variables = get_collection_by_handle::Variables {
            handle: handle.to_string(),
            first,
        };

        let data = self.execute::<GetCollectionByHandle>(variables).await?;

        data.collection
            .and_then(convert_collection)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart, optionally with initial lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput { lines },
        };

        let data = self.execute::<CreateCart>(variables).await?;
        cart_from_payload(data.cart_create, "Failed to create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if Shopify no longer knows the cart, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        data.cart
            .and_then(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<AddToCart>(variables).await?;
        cart_from_payload(data.cart_lines_add, "Failed to add to cart")
    }

    /// Update cart line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;
        cart_from_payload(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids,
        };

        let data = self.execute::<RemoveFromCart>(variables).await?;
        cart_from_payload(data.cart_lines_remove, "Failed to remove from cart")
    }

    // =========================================================================
    // Customer Methods
    // =========================================================================

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when Shopify rejects the input (e.g. the email is
    /// taken), or an error if the API request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn customer_create(
        &self,
        input: CustomerCreateInput,
    ) -> Result<Customer, ShopifyError> {
        let variables = customer_create::Variables { input };

        let data = self.execute::<CustomerCreate>(variables).await?;
        let payload = data.customer_create.unwrap_or_default();

        if let Some(message) = join_user_errors(payload.customer_user_errors.unwrap_or_default()) {
            return Err(ShopifyError::UserError(message));
        }

        payload
            .customer
            .and_then(convert_customer)
            .ok_or_else(|| ShopifyError::graphql_message("Failed to create customer"))
    }

    /// Exchange credentials for a customer access token.
    ///
    /// # Errors
    ///
    /// Returns `UserError` for bad credentials, or an error if the API
    /// request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn customer_access_token_create(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let variables = customer_access_token_create::Variables {
            input: customer_access_token_create::CustomerAccessTokenCreateInput {
                email: email.to_string(),
                password: password.expose_secret().to_string(),
            },
        };

        let data = self.execute::<CustomerAccessTokenCreate>(variables).await?;
        let payload = data.customer_access_token_create.unwrap_or_default();

        if let Some(message) = join_user_errors(payload.customer_user_errors.unwrap_or_default()) {
            return Err(ShopifyError::UserError(message));
        }

        payload
            .customer_access_token
            .and_then(convert_access_token)
            .ok_or_else(|| ShopifyError::UserError("Unidentified customer".to_string()))
    }

    /// Get the customer that owns an access token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the token is expired or unknown, or an error
    /// if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_customer(&self, access_token: &str) -> Result<Customer, ShopifyError> {
        let variables = get_customer::Variables {
            customer_access_token: access_token.to_string(),
        };

        let data = self.execute::<GetCustomer>(variables).await?;

        data.customer
            .and_then(convert_customer)
            .ok_or_else(|| ShopifyError::NotFound("Customer session expired".to_string()))
    }
}

impl CartBackend for StorefrontClient {
    fn cart_create(
        &self,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        self.create_cart(lines)
    }

    fn cart_fetch(&self, cart_id: &str) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        self.get_cart(cart_id)
    }

    fn cart_lines_add(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        self.add_to_cart(cart_id, lines)
    }

    fn cart_lines_update(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        self.update_cart(cart_id, lines)
    }

    fn cart_lines_remove(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        self.remove_from_cart(cart_id, line_ids)
    }
}

/// Unwrap a cart mutation payload: user errors first, then the cart.
fn cart_from_payload(
    payload: Option<RawCartPayload>,
    failure: &str,
) -> Result<Cart, ShopifyError> {
    let payload = payload.unwrap_or_default();

    if let Some(message) = join_user_errors(payload.user_errors) {
        return Err(ShopifyError::UserError(message));
    }

    payload
        .cart
        .and_then(convert_cart)
        .ok_or_else(|| ShopifyError::graphql_message(failure))
}

fn convert_graphql_error(e: graphql_client::Error) -> GraphQLError {
    let code = e
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    GraphQLError {
        message: e.message,
        code,
        locations: e.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: e.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
