use thiserror::Error;

use crate::provider::IdentityProviderError;

/// Error kinds surfaced by the session flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, invalid or expired session, or no usable profile.
    ///
    /// Never retried; callers redirect to login or answer 401.
    #[error("unauthorized")]
    Unauthorized,

    /// A required configuration value is absent.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
}

impl From<IdentityProviderError> for AuthError {
    fn from(value: IdentityProviderError) -> Self {
        match value {
            IdentityProviderError::NotConfigured(what) => AuthError::ConfigurationMissing(what),
            // Provider outages fail closed, like a bad token.
            IdentityProviderError::InvalidToken(_)
            | IdentityProviderError::Expired
            | IdentityProviderError::Unavailable(_) => AuthError::Unauthorized,
        }
    }
}
