//! Shopify Storefront API client and domain types.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents, sent with `graphql_client`'s request
//!   envelope over `reqwest`
//! - Responses land in permissive `raw` structs (every field optional) and are
//!   normalized into the domain types in [`types`]
//! - Transient failures (429, 5xx, throttling) are retried with exponential
//!   backoff inside the client; callers see the last error
//! - Shopify is the source of truth for carts; the client never caches them
//!
//! # Example
//!
//! ```rust,ignore
//! use ankkor_storefront::shopify::{CartLineInput, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify)?;
//!
//! // Get a product
//! let product = client.get_product_by_handle("linen-shirt").await?;
//!
//! // Create a cart and add items
//! let cart = client.create_cart(Vec::new()).await?;
//! let cart = client
//!     .add_to_cart(&cart.id, vec![CartLineInput::new(&product.variants[0].id, 1)])
//!     .await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::retry::RetryPolicy;
pub use storefront::{CartBackend, StorefrontClient};
pub use types::*;

use thiserror::Error;

/// Substrings in GraphQL error messages that indicate a transient failure.
const RETRYABLE_MESSAGE_HINTS: &[&str] = &[
    "timeout",
    "timed out",
    "throttled",
    "rate limit",
    "internal server error",
    "service unavailable",
];

/// GraphQL `extensions.code` values that indicate a transient failure.
const RETRYABLE_ERROR_CODES: &[&str] = &["THROTTLED", "INTERNAL_SERVER_ERROR"];

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status other than 429.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited{}", format_retry_after(.retry_after))]
    RateLimited {
        /// Seconds from the `Retry-After` header, when present.
        retry_after: Option<u64>,
    },

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Whether the request that produced this error is worth repeating.
    ///
    /// **Retryable:** 429, 5xx, transport timeouts and connect failures, and
    /// GraphQL errors that look like throttling or a server fault.
    ///
    /// **Not retryable:** other 4xx, malformed JSON, not-found and user
    /// errors. Repeating the request returns the same answer.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::GraphQL(errors) => errors.iter().any(GraphQLError::is_transient),
            Self::Parse(_) | Self::NotFound(_) | Self::UserError(_) => false,
        }
    }

    /// Server-requested delay before the next attempt, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Build a single-message GraphQL error.
    pub(crate) fn graphql_message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            code: None,
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// `extensions.code`, when Shopify sends one (e.g. `THROTTLED`).
    pub code: Option<String>,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    fn is_transient(&self) -> bool {
        if self
            .code
            .as_deref()
            .is_some_and(|code| RETRYABLE_ERROR_CODES.contains(&code))
        {
            return true;
        }
        let message = self.message.to_lowercase();
        RETRYABLE_MESSAGE_HINTS
            .iter()
            .any(|hint| message.contains(hint))
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

#[allow(clippy::ref_option)] // thiserror hands over field references
fn format_retry_after(retry_after: &Option<u64>) -> String {
    retry_after.map_or_else(String::new, |secs| {
        format!(", retry after {secs} seconds")
    })
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn graphql(message: &str, code: Option<&str>) -> ShopifyError {
        ShopifyError::GraphQL(vec![GraphQLError {
            message: message.to_string(),
            code: code.map(str::to_string),
            locations: vec![],
            path: vec![],
        }])
    }

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError {
                message: "Field not found".to_string(),
                code: None,
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                code: None,
                locations: vec![],
                path: vec![],
            },
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_empty_messages() {
        let err = ShopifyError::GraphQL(vec![GraphQLError {
            message: String::new(),
            code: None,
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("products".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: products.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = ShopifyError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ShopifyError::RateLimited {
            retry_after: Some(60),
        };
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");

        let err = ShopifyError::RateLimited { retry_after: None };
        assert_eq!(err.to_string(), "Rate limited");
    }

    #[test]
    fn test_retryable_statuses() {
        let server = ShopifyError::Status {
            status: 503,
            message: String::new(),
        };
        let client = ShopifyError::Status {
            status: 404,
            message: String::new(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(ShopifyError::RateLimited { retry_after: None }.is_retryable());
    }

    #[test]
    fn test_retryable_graphql_keywords() {
        assert!(graphql("Request Timeout", None).is_retryable());
        assert!(graphql("Throttled", None).is_retryable());
        assert!(graphql("Internal Server Error", None).is_retryable());
        assert!(graphql("exceeded rate limit", None).is_retryable());
        assert!(graphql("something", Some("THROTTLED")).is_retryable());
        assert!(!graphql("Variable $handle of type String! was provided invalid value", None).is_retryable());
    }

    #[test]
    fn test_non_retryable_variants() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ShopifyError::Parse(parse).is_retryable());
        assert!(!ShopifyError::NotFound("x".to_string()).is_retryable());
        assert!(!ShopifyError::UserError("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        assert_eq!(
            ShopifyError::RateLimited {
                retry_after: Some(3)
            }
            .retry_after(),
            Some(3)
        );
        assert_eq!(graphql("Throttled", None).retry_after(), None);
    }
}
