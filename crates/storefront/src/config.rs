//! Storefront configuration loaded from environment variables.
//!
//! The variable names are shared with the web frontend, hence the
//! `NEXT_PUBLIC_` prefixes.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NEXT_PUBLIC_SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., ankkor.myshopify.com)
//! - `NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `NEXT_PUBLIC_USE_SHOPIFY_CART` - `true` to use the Shopify-backed cart (default: simple cart)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `NEXT_PUBLIC_EMAILJS_SERVICE_ID` - EmailJS service for the contact form
//! - `NEXT_PUBLIC_EMAILJS_TEMPLATE_ID` - EmailJS template for the contact form
//! - `NEXT_PUBLIC_EMAILJS_PUBLIC_KEY` - EmailJS public key
//! - `ANKKOR_DATA_DIR` - Directory for persisted stores and cache (default: .ankkor)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2025-01";
const DEFAULT_DATA_DIR: &str = ".ankkor";

const EMAILJS_SERVICE_ID: &str = "NEXT_PUBLIC_EMAILJS_SERVICE_ID";
const EMAILJS_TEMPLATE_ID: &str = "NEXT_PUBLIC_EMAILJS_TEMPLATE_ID";
const EMAILJS_PUBLIC_KEY: &str = "NEXT_PUBLIC_EMAILJS_PUBLIC_KEY";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Whether cart operations go through Shopify (otherwise the local simple cart)
    pub use_shopify_cart: bool,
    /// Contact form relay, when all EmailJS keys are present
    pub emailjs: Option<EmailJsConfig>,
    /// Directory holding persisted stores and the catalog cache
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain without scheme (e.g., ankkor.myshopify.com)
    pub store_domain: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Storefront API access token
    pub access_token: SecretString,
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// EmailJS configuration for the contact form relay.
#[derive(Clone)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: SecretString,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or if the
    /// EmailJS keys are only partially set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let shopify = ShopifyStorefrontConfig {
            store_domain: normalize_store_domain(
                &vars.required("NEXT_PUBLIC_SHOPIFY_STORE_DOMAIN")?,
            )?,
            api_version: vars.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: SecretString::from(
                vars.required("NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN")?,
            ),
        };

        let use_shopify_cart = vars
            .optional("NEXT_PUBLIC_USE_SHOPIFY_CART")
            .is_some_and(|v| parse_flag(&v));

        Ok(Self {
            shopify,
            use_shopify_cart,
            emailjs: EmailJsConfig::from_vars(&vars)?,
            data_dir: PathBuf::from(vars.or_default("ANKKOR_DATA_DIR", DEFAULT_DATA_DIR)),
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }
}

impl EmailJsConfig {
    fn from_vars<F>(vars: &Vars<'_, F>) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_id = vars.optional(EMAILJS_SERVICE_ID);
        let template_id = vars.optional(EMAILJS_TEMPLATE_ID);
        let public_key = vars.optional(EMAILJS_PUBLIC_KEY);

        match (service_id, template_id, public_key) {
            (None, None, None) => Ok(None),
            (Some(service_id), Some(template_id), Some(public_key)) => Ok(Some(Self {
                service_id,
                template_id,
                public_key: SecretString::from(public_key),
            })),
            (service_id, template_id, _) => {
                let missing = if service_id.is_none() {
                    EMAILJS_SERVICE_ID
                } else if template_id.is_none() {
                    EMAILJS_TEMPLATE_ID
                } else {
                    EMAILJS_PUBLIC_KEY
                };
                Err(ConfigError::MissingEnvVar(missing.to_string()))
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the usual required/optional/default accessors.
struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Accepts `true`/`1` (any case) as enabled; everything else is disabled.
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

/// Strip a scheme and trailing slash so the domain can be put in a URL.
fn normalize_store_domain(raw: &str) -> Result<String, ConfigError> {
    let domain = raw
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    if domain.is_empty() || domain.contains('/') {
        return Err(ConfigError::InvalidEnvVar(
            "NEXT_PUBLIC_SHOPIFY_STORE_DOMAIN".to_string(),
            format!("expected a bare domain, got {raw:?}"),
        ));
    }
    Ok(domain.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: [(&str, &str); 2] = [
        ("NEXT_PUBLIC_SHOPIFY_STORE_DOMAIN", "ankkor.myshopify.com"),
        ("NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN", "tok_123"),
    ];

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&BASE).unwrap();
        assert_eq!(config.shopify.api_version, "2025-01");
        assert_eq!(config.shopify.access_token.expose_secret(), "tok_123");
        assert!(!config.use_shopify_cart);
        assert!(config.emailjs.is_none());
        assert_eq!(config.data_dir, PathBuf::from(".ankkor"));
        assert_eq!(
            config.shopify.endpoint(),
            "https://ankkor.myshopify.com/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn test_missing_token() {
        let err = load(&BASE[..1]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEnvVar(ref k) if k == "NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN"
        ));
    }

    #[test]
    fn test_store_domain_scheme_is_stripped() {
        let config = load(&[
            ("NEXT_PUBLIC_SHOPIFY_STORE_DOMAIN", "https://ankkor.myshopify.com/"),
            BASE[1],
        ])
        .unwrap();
        assert_eq!(config.shopify.store_domain, "ankkor.myshopify.com");
    }

    #[test]
    fn test_store_domain_with_path_is_invalid() {
        let err = load(&[
            ("NEXT_PUBLIC_SHOPIFY_STORE_DOMAIN", "ankkor.myshopify.com/admin"),
            BASE[1],
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_use_shopify_cart_flag() {
        for (value, expected) in [("true", true), ("TRUE", true), ("1", true), ("false", false), ("yes", false)] {
            let config = load(&[BASE[0], BASE[1], ("NEXT_PUBLIC_USE_SHOPIFY_CART", value)]).unwrap();
            assert_eq!(config.use_shopify_cart, expected, "value {value:?}");
        }
    }

    #[test]
    fn test_emailjs_all_keys() {
        let config = load(&[
            BASE[0],
            BASE[1],
            (EMAILJS_SERVICE_ID, "service_x"),
            (EMAILJS_TEMPLATE_ID, "template_y"),
            (EMAILJS_PUBLIC_KEY, "pk_z"),
        ])
        .unwrap();
        let emailjs = config.emailjs.unwrap();
        assert_eq!(emailjs.service_id, "service_x");
        assert_eq!(emailjs.public_key.expose_secret(), "pk_z");
    }

    #[test]
    fn test_emailjs_partial_is_an_error() {
        let err = load(&[BASE[0], BASE[1], (EMAILJS_SERVICE_ID, "service_x")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEnvVar(ref k) if k == EMAILJS_TEMPLATE_ID
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            BASE[0],
            ("NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN", "super_secret_token"),
            (EMAILJS_SERVICE_ID, "service_x"),
            (EMAILJS_TEMPLATE_ID, "template_y"),
            (EMAILJS_PUBLIC_KEY, "super_secret_key"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("ankkor.myshopify.com"));
        assert!(debug_output.contains("service_x"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
        assert!(!debug_output.contains("super_secret_key"));
    }
}
