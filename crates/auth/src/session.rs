//! Session codec: identity assertion ⇄ session artifact + cookie.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, warn};

use crate::error::AuthError;
use crate::provider::{Identity, IdentityProvider};

/// Cookie carrying the session artifact.
pub const SESSION_COOKIE: &str = "session";

/// Default session validity: 5 days.
pub const SESSION_MAX_AGE_SECS: i64 = 432_000;

/// How the session cookie is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    pub max_age: Duration,
    /// Set the `Secure` attribute (production only).
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            max_age: Duration::seconds(SESSION_MAX_AGE_SECS),
            secure,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

/// A `Set-Cookie` instruction for the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub max_age_secs: i64,
    pub secure: bool,
}

impl SessionCookie {
    /// Whether this instruction removes the cookie.
    pub fn is_cleared(&self) -> bool {
        self.max_age_secs == 0 && self.value.is_empty()
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, self.value, self.max_age_secs
        );
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionArtifact {
    pub token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
    pub cookie: SessionCookie,
}

pub struct SessionCodec {
    provider: Arc<dyn IdentityProvider>,
    policy: CookiePolicy,
}

impl SessionCodec {
    pub fn new(provider: Arc<dyn IdentityProvider>, policy: CookiePolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &CookiePolicy {
        &self.policy
    }

    /// Exchange a valid identity assertion for a session artifact.
    pub async fn create_session(
        &self,
        id_token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionArtifact, AuthError> {
        if id_token.trim().is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let Some(expires_at) = now.checked_add_signed(self.policy.max_age) else {
            error!(
                max_age_secs = self.policy.max_age.num_seconds(),
                "session lifetime overflows the clock"
            );
            return Err(AuthError::Unauthorized);
        };

        let identity = self
            .provider
            .verify_id_token(id_token, now)
            .await
            .map_err(|e| {
                warn!(error = %e, "identity assertion rejected");
                AuthError::from(e)
            })?;

        let token = self
            .provider
            .create_session_token(&identity, self.policy.max_age, now)
            .await
            .map_err(|e| {
                warn!(error = %e, identity_id = %identity.id, "session minting failed");
                AuthError::from(e)
            })?;

        debug!(identity_id = %identity.id, "session created");

        let cookie = SessionCookie {
            name: self.policy.name.clone(),
            value: token.clone(),
            max_age_secs: self.policy.max_age.num_seconds(),
            secure: self.policy.secure,
        };

        Ok(SessionArtifact {
            token,
            identity,
            expires_at,
            cookie,
        })
    }

    /// Clear the session cookie. Unconditional and idempotent.
    pub fn destroy_session(&self) -> SessionCookie {
        SessionCookie {
            name: self.policy.name.clone(),
            value: String::new(),
            max_age_secs: 0,
            secure: self.policy.secure,
        }
    }

    /// Turn a session artifact back into the identity it was minted for.
    pub async fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Unauthorized);
        }
        self.provider
            .verify_session_token(token, now)
            .await
            .map_err(|e| {
                debug!(error = %e, "session artifact rejected");
                AuthError::from(e)
            })
    }
}

/// Find a cookie value in a `Cookie` request header.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|part| {
        let (k, v) = part.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}
