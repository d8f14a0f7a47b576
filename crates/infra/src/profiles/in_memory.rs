use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use bizdesk_auth::{Profile, ProfileStore, StoreError};
use bizdesk_core::IdentityId;

/// In-memory profile documents for tests/dev.
///
/// Documents are kept as raw JSON, like the hosted document database, so
/// invalid documents can be stored and are only rejected when loaded.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    inner: RwLock<HashMap<IdentityId, serde_json::Value>>,
    unavailable: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.inner.write() {
            for profile in profiles {
                map.insert(profile.id.clone(), profile.to_document());
            }
        }
        store
    }

    /// Simulate an outage: every call fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: &IdentityId) -> Result<Option<serde_json::Value>, StoreError> {
        self.ensure_available()?;
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    async fn put(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(id.clone(), document);
        Ok(())
    }

    async fn create(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(id) {
            return Err(StoreError::AlreadyExists);
        }
        map.insert(id.clone(), document);
        Ok(())
    }
}
