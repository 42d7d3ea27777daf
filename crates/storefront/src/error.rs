//! Unified error handling with Sentry integration.
//!
//! Every concern has its own error enum. `AppError` gathers them for the
//! command surface, decides which failures are worth reporting to Sentry,
//! and turns them into messages safe to show a shopper.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::seo_audit::SeoAuditError;
use crate::services::ContactError;
use crate::shopify::ShopifyError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Checkout could not be started.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Contact relay failed.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// SEO audit could not run.
    #[error("SEO audit error: {0}")]
    SeoAudit(#[from] SeoAuditError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Customer is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this failure is ours (or an upstream's) rather than the user's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Shopify(err) => !matches!(
                err,
                ShopifyError::NotFound(_) | ShopifyError::UserError(_)
            ),
            Self::Checkout(CheckoutError::Shopify(err)) => !matches!(err, ShopifyError::NotFound(_)),
            Self::Checkout(CheckoutError::EmptyCart)
            | Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::BadRequest(_)
            | Self::SeoAudit(SeoAuditError::RootNotFound(_)) => false,
            Self::Config(_)
            | Self::Storage(_)
            | Self::Checkout(_)
            | Self::Contact(_)
            | Self::SeoAudit(_) => true,
        }
    }

    /// Report server-side failures to Sentry and log them.
    ///
    /// User errors are only logged at debug level.
    pub fn capture(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::debug!(error = %self, "User error");
        }
    }

    /// A message that can be shown to the shopper.
    ///
    /// Internal details are hidden; Shopify's own user-facing validation
    /// messages are passed through.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::SeoAudit(SeoAuditError::Walk(_)) => {
                "Internal error".to_string()
            }
            Self::Shopify(ShopifyError::NotFound(what)) | Self::NotFound(what) => {
                format!("Not found: {what}")
            }
            Self::Shopify(ShopifyError::UserError(message)) => message.clone(),
            Self::Shopify(ShopifyError::RateLimited { .. }) => {
                "The store is busy, please try again shortly".to_string()
            }
            Self::Shopify(_) | Self::Checkout(CheckoutError::Shopify(_)) => {
                "External service error".to_string()
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Checkout(_) => "Checkout is unavailable right now".to_string(),
            Self::Contact(ContactError::NotConfigured) => {
                "The contact form is not available".to_string()
            }
            Self::Contact(_) => "Your message could not be sent, please try again".to_string(),
            Self::SeoAudit(SeoAuditError::RootNotFound(path)) => {
                format!("Project not found: {}", path.display())
            }
            Self::Unauthorized(_) => "Please sign in".to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Associate subsequent Sentry events with a signed-in customer.
pub fn set_sentry_user(customer_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "gid://shopify/ProductVariant/1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("linen-shirt".to_string());
        assert_eq!(err.to_string(), "Not found: linen-shirt");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: Cart is empty");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::from(ShopifyError::Status {
            status: 502,
            message: String::new()
        })
        .is_server_error());
        assert!(AppError::from(CheckoutError::MissingCheckoutUrl).is_server_error());
        assert!(!AppError::from(ShopifyError::NotFound("x".to_string())).is_server_error());
        assert!(!AppError::from(ShopifyError::UserError("bad".to_string())).is_server_error());
        assert!(!AppError::from(CheckoutError::EmptyCart).is_server_error());
        assert!(!AppError::BadRequest("qty".to_string()).is_server_error());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::from(ShopifyError::Status {
            status: 500,
            message: "stack trace here".to_string(),
        });
        assert_eq!(err.user_message(), "External service error");

        let err = AppError::from(ConfigError::MissingEnvVar("SECRET".to_string()));
        assert_eq!(err.user_message(), "Internal error");

        let err = AppError::from(ShopifyError::UserError("Email has already been taken".to_string()));
        assert_eq!(err.user_message(), "Email has already been taken");

        let err = AppError::from(ShopifyError::RateLimited { retry_after: Some(2) });
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn test_capture_without_client_does_not_panic() {
        AppError::Unauthorized("no token".to_string()).capture();
        AppError::from(ShopifyError::graphql_message("No data in response")).capture();
    }
}
