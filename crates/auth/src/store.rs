//! Document-database boundary for profiles.

use async_trait::async_trait;
use thiserror::Error;

use bizdesk_core::IdentityId;

use crate::profile::{Profile, ProfileError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document already exists")]
    AlreadyExists,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileLoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Invalid(#[from] ProfileError),
}

/// Profile documents keyed by identity id.
///
/// Implementations hold raw JSON; validation happens in [`ProfileStore::load`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, id: &IdentityId) -> Result<Option<serde_json::Value>, StoreError>;

    /// Insert or overwrite (last write wins).
    async fn put(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError>;

    /// Insert only if no document exists for `id`.
    async fn create(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError>;

    async fn load(&self, id: &IdentityId) -> Result<Option<Profile>, ProfileLoadError> {
        match self.get(id).await? {
            Some(doc) => Ok(Some(Profile::from_document(id, doc)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        self.put(&profile.id, profile.to_document()).await
    }
}
