use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a signed token may be used for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    /// Short-lived identity assertion handed to the client after sign-in.
    Id,
    /// Long-lived session artifact stored in the `session` cookie.
    Session,
}

/// Claims carried by identity assertions and session artifacts.
///
/// Timestamps are unix seconds, as in any JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity-provider user id.
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub token_use: TokenUse,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token is a {actual:?} token, expected {expected:?}")]
    WrongUse { expected: TokenUse, actual: TokenUse },
}

/// Tolerated skew between the issuer's clock and ours on `iat`, as in
/// `jsonwebtoken`'s default leeway. Expiry is not extended.
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 60;

/// Deterministically validate token claims against the clock.
///
/// Signature verification happens before this, in the identity provider.
pub fn validate_claims(
    claims: &TokenClaims,
    expected: TokenUse,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.token_use != expected {
        return Err(TokenValidationError::WrongUse {
            expected,
            actual: claims.token_use,
        });
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now.saturating_add(CLOCK_SKEW_LEEWAY_SECS) < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
