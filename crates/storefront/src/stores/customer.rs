//! Signed-in customer session, persisted under `ankkor-customer-token`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::shopify::types::CustomerAccessToken;
use crate::storage::{KeyValueStore, StorageError, keys, load_state, save_state};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSession {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub email: String,
}

impl CustomerSession {
    /// Build a session from a token response. An unparsable expiry is kept
    /// as unknown and the token is treated as live until Shopify rejects it.
    #[must_use]
    pub fn from_token(token: CustomerAccessToken, email: &str) -> Self {
        let expires_at = match DateTime::parse_from_rfc3339(&token.expires_at) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!(expires_at = %token.expires_at, error = %e, "Unparsable token expiry");
                None
            }
        };
        Self {
            access_token: token.access_token,
            expires_at,
            email: email.to_string(),
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

pub struct CustomerSessionStore {
    storage: Arc<dyn KeyValueStore>,
    session: Option<CustomerSession>,
}

impl std::fmt::Debug for CustomerSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerSessionStore")
            .field("signed_in", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl CustomerSessionStore {
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = load_state(storage.as_ref(), keys::CUSTOMER_TOKEN);
        Self { storage, session }
    }

    /// The session, unless it has expired.
    #[must_use]
    pub fn current(&self) -> Option<&CustomerSession> {
        self.session
            .as_ref()
            .filter(|s| !s.is_expired_at(Utc::now()))
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub fn sign_in(&mut self, session: CustomerSession) -> Result<(), StorageError> {
        save_state(self.storage.as_ref(), keys::CUSTOMER_TOKEN, &session)?;
        self.session = Some(session);
        Ok(())
    }

    /// Forget the session. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be removed.
    pub fn sign_out(&mut self) -> Result<bool, StorageError> {
        self.session = None;
        self.storage.remove(keys::CUSTOMER_TOKEN)
    }
}
