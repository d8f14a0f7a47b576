//! Identity-provider boundary.
//!
//! The provider owns identities and the signatures on both identity
//! assertions and session artifacts. This crate only sees the trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bizdesk_core::IdentityId;

/// An authenticated identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: IdentityId) -> Self {
        Self { id, email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityProviderError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("identity provider not configured: {0}")]
    NotConfigured(String),
}

/// Operations the session flow needs from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a short-lived identity assertion (signature + expiry).
    async fn verify_id_token(
        &self,
        id_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError>;

    /// Mint a signed session artifact valid for `valid_for` from `now`.
    async fn create_session_token(
        &self,
        identity: &Identity,
        valid_for: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityProviderError>;

    /// Verify a session artifact previously minted by this provider.
    async fn verify_session_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError>;
}
