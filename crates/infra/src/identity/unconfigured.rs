use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use bizdesk_auth::{Identity, IdentityProvider, IdentityProviderError};

/// Stand-in used when the provider's configuration is absent.
///
/// Every call fails with [`IdentityProviderError::NotConfigured`] so the
/// session endpoints answer 500 instead of silently accepting or rejecting.
#[derive(Debug, Clone)]
pub struct UnconfiguredIdentityProvider {
    missing: String,
}

impl UnconfiguredIdentityProvider {
    pub fn new(missing: impl Into<String>) -> Self {
        Self {
            missing: missing.into(),
        }
    }

    fn error(&self) -> IdentityProviderError {
        IdentityProviderError::NotConfigured(self.missing.clone())
    }
}

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    async fn verify_id_token(
        &self,
        _id_token: &str,
        _now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError> {
        Err(self.error())
    }

    async fn create_session_token(
        &self,
        _identity: &Identity,
        _valid_for: Duration,
        _now: DateTime<Utc>,
    ) -> Result<String, IdentityProviderError> {
        Err(self.error())
    }

    async fn verify_session_token(
        &self,
        _token: &str,
        _now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError> {
        Err(self.error())
    }
}
