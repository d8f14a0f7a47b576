//! Self-hosted identity provider signing HS256 JWTs.
//!
//! Both identity assertions and session artifacts are JWTs signed with the
//! same secret and told apart by the `token_use` claim. Expiry is checked by
//! [`validate_claims`] against the caller's clock, not by `jsonwebtoken`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::instrument;

use bizdesk_auth::{
    validate_claims, Identity, IdentityProvider, IdentityProviderError, TokenClaims, TokenUse,
    TokenValidationError,
};
use bizdesk_core::IdentityId;

/// Validity of identity assertions minted by [`Hs256IdentityProvider::mint_id_token`].
pub const ID_TOKEN_TTL_SECS: i64 = 3_600;

pub struct Hs256IdentityProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256IdentityProvider {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue an identity assertion, as the sign-in flow of the provider would.
    pub fn mint_id_token(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityProviderError> {
        let expires_at = expiry(now, Duration::seconds(ID_TOKEN_TTL_SECS))?;
        self.sign(identity, TokenUse::Id, now, expires_at)
    }

    fn sign(
        &self,
        identity: &Identity,
        token_use: TokenUse,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, IdentityProviderError> {
        let claims = TokenClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            token_use,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| IdentityProviderError::Unavailable(format!("signing failed: {e}")))
    }

    fn verify(
        &self,
        token: &str,
        expected: TokenUse,
        now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityProviderError::Expired,
                _ => IdentityProviderError::InvalidToken(e.to_string()),
            })?;
        let claims = data.claims;

        validate_claims(&claims, expected, now).map_err(|e| match e {
            TokenValidationError::Expired => IdentityProviderError::Expired,
            other => IdentityProviderError::InvalidToken(other.to_string()),
        })?;

        let id = IdentityId::new(claims.sub)
            .map_err(|e| IdentityProviderError::InvalidToken(e.to_string()))?;

        Ok(Identity {
            id,
            email: claims.email,
        })
    }
}

fn expiry(now: DateTime<Utc>, valid_for: Duration) -> Result<DateTime<Utc>, IdentityProviderError> {
    now.checked_add_signed(valid_for).ok_or_else(|| {
        IdentityProviderError::Unavailable(format!(
            "token lifetime of {}s is out of range",
            valid_for.num_seconds()
        ))
    })
}

#[async_trait]
impl IdentityProvider for Hs256IdentityProvider {
    #[instrument(skip_all)]
    async fn verify_id_token(
        &self,
        id_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError> {
        self.verify(id_token, TokenUse::Id, now)
    }

    #[instrument(skip_all, fields(identity_id = %identity.id))]
    async fn create_session_token(
        &self,
        identity: &Identity,
        valid_for: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityProviderError> {
        let expires_at = expiry(now, valid_for)?;
        self.sign(identity, TokenUse::Session, now, expires_at)
    }

    #[instrument(skip_all)]
    async fn verify_session_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, IdentityProviderError> {
        self.verify(token, TokenUse::Session, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new(IdentityId::new("alice").unwrap()).with_email("alice@example.com")
    }

    #[tokio::test]
    async fn id_token_verifies_with_same_secret() {
        let provider = Hs256IdentityProvider::new("s3cret");
        let now = Utc::now();
        let token = provider.mint_id_token(&alice(), now).unwrap();

        let identity = provider.verify_id_token(&token, now).await.unwrap();
        assert_eq!(identity, alice());
    }

    #[tokio::test]
    async fn assertion_from_a_fast_issuer_clock_is_accepted() {
        let provider = Hs256IdentityProvider::new("s3cret");
        let now = Utc::now();
        let ahead = provider.mint_id_token(&alice(), now + Duration::seconds(30)).unwrap();
        assert!(provider.verify_id_token(&ahead, now).await.is_ok());

        let far_ahead = provider.mint_id_token(&alice(), now + Duration::minutes(10)).unwrap();
        assert!(matches!(
            provider.verify_id_token(&far_ahead, now).await,
            Err(IdentityProviderError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn other_secret_is_rejected() {
        let now = Utc::now();
        let token = Hs256IdentityProvider::new("one")
            .mint_id_token(&alice(), now)
            .unwrap();

        let err = Hs256IdentityProvider::new("two")
            .verify_id_token(&token, now)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityProviderError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn expired_assertion_is_reported_as_expired() {
        let provider = Hs256IdentityProvider::new("s3cret");
        let issued = Utc::now() - Duration::hours(2);
        let token = provider.mint_id_token(&alice(), issued).unwrap();

        let err = provider.verify_id_token(&token, Utc::now()).await.unwrap_err();
        assert_eq!(err, IdentityProviderError::Expired);
    }

    #[tokio::test]
    async fn tokens_cannot_be_swapped_between_uses() {
        let provider = Hs256IdentityProvider::new("s3cret");
        let now = Utc::now();
        let id_token = provider.mint_id_token(&alice(), now).unwrap();
        let session = provider
            .create_session_token(&alice(), Duration::days(5), now)
            .await
            .unwrap();

        assert!(provider.verify_session_token(&id_token, now).await.is_err());
        assert!(provider.verify_id_token(&session, now).await.is_err());
        assert_eq!(
            provider.verify_session_token(&session, now).await.unwrap().id,
            alice().id
        );
    }

    #[tokio::test]
    async fn session_expires_after_its_window() {
        let provider = Hs256IdentityProvider::new("s3cret");
        let now = Utc::now();
        let session = provider
            .create_session_token(&alice(), Duration::days(5), now)
            .await
            .unwrap();

        let later = now + Duration::days(5) + Duration::seconds(1);
        assert_eq!(
            provider.verify_session_token(&session, later).await.unwrap_err(),
            IdentityProviderError::Expired
        );
    }

    #[tokio::test]
    async fn overflowing_session_lifetime_is_an_error() {
        let provider = Hs256IdentityProvider::new("s3cret");
        let err = provider
            .create_session_token(&alice(), Duration::seconds(100_000_000_000_000), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let provider = Hs256IdentityProvider::new("s3cret");
        assert!(matches!(
            provider.verify_session_token("not.a.jwt", Utc::now()).await,
            Err(IdentityProviderError::InvalidToken(_))
        ));
    }
}
