//! EmailJS client for the contact form relay.
//!
//! The contact form never reaches our own backend: the message is handed to
//! EmailJS, which mails it using a stored template.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::EmailJsConfig;

/// EmailJS send endpoint.
pub const SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Errors that can occur when relaying a contact message.
#[derive(Debug, Error)]
pub enum ContactError {
    /// Contact relay keys are not configured.
    #[error("Contact form is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// EmailJS answered with a non-success status.
    #[error("EmailJS rejected the message: {status} - {message}")]
    Rejected { status: u16, message: String },
}

/// A message from the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ContactMessage,
}

/// EmailJS REST client.
#[derive(Clone)]
pub struct EmailJsClient {
    client: reqwest::Client,
    config: EmailJsConfig,
    endpoint: String,
}

impl std::fmt::Debug for EmailJsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsClient")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl EmailJsClient {
    /// Create a client posting to the public EmailJS API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: EmailJsConfig) -> Result<Self, ContactError> {
        Self::with_endpoint(config, SEND_URL)
    }

    /// Create a client posting to a different send URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_endpoint(
        config: EmailJsConfig,
        endpoint: impl Into<String>,
    ) -> Result<Self, ContactError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            config,
            endpoint: endpoint.into(),
        })
    }

    /// Relay a contact message.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` on a non-2xx answer, `Http` if the request fails.
    #[instrument(skip_all, fields(from_email = %message.from_email))]
    pub async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: self.config.public_key.expose_secret(),
            template_params: message,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ContactError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!("Contact message relayed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let message = ContactMessage {
            from_name: "Asha".to_string(),
            from_email: "asha@example.com".to_string(),
            subject: "Sizing".to_string(),
            message: "Do you stock XS?".to_string(),
        };
        let body = SendRequest {
            service_id: "service_1",
            template_id: "template_1",
            user_id: "public_key",
            template_params: &message,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["service_id"], "service_1");
        assert_eq!(json["user_id"], "public_key");
        assert_eq!(json["template_params"]["from_email"], "asha@example.com");
        assert_eq!(json["template_params"]["message"], "Do you stock XS?");
    }

    #[test]
    fn test_debug_redacts_public_key() {
        let client = EmailJsClient::new(EmailJsConfig {
            service_id: "service_1".to_string(),
            template_id: "template_1".to_string(),
            public_key: SecretString::from("pk_live_123".to_string()),
        })
        .unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("pk_live_123"));
        assert!(debug.contains(SEND_URL));
    }
}
