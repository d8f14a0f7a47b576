//! Session verification: artifact → identity → profile → role.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use bizdesk_core::IdentityId;

use crate::error::AuthError;
use crate::session::SessionCodec;
use crate::store::{ProfileLoadError, ProfileStore};
use crate::Role;

/// A verified session: who is calling and with which role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSession {
    pub identity_id: IdentityId,
    pub role: Role,
}

pub struct SessionVerifier {
    codec: Arc<SessionCodec>,
    profiles: Arc<dyn ProfileStore>,
}

impl SessionVerifier {
    pub fn new(codec: Arc<SessionCodec>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { codec, profiles }
    }

    pub fn codec(&self) -> &Arc<SessionCodec> {
        &self.codec
    }

    /// Verify a session artifact and resolve the caller's role.
    ///
    /// A bad artifact and a missing or invalid profile both come back as
    /// [`AuthError::Unauthorized`]; the distinction is only logged.
    pub async fn verify(
        &self,
        artifact: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedSession, AuthError> {
        let identity = self.codec.decode(artifact, now).await?;

        let profile = match self.profiles.load(&identity.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                debug!(identity_id = %identity.id, "no profile for verified identity");
                return Err(AuthError::Unauthorized);
            }
            Err(ProfileLoadError::Invalid(e)) => {
                warn!(identity_id = %identity.id, error = %e, "stored profile is invalid");
                return Err(AuthError::Unauthorized);
            }
            Err(ProfileLoadError::Store(e)) => {
                error!(identity_id = %identity.id, error = %e, "profile read failed during verification");
                return Err(AuthError::Unauthorized);
            }
        };

        Ok(VerifiedSession {
            identity_id: identity.id,
            role: profile.role,
        })
    }
}
