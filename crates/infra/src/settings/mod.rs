//! Per-company module toggles.
//!
//! Reads here are not security-critical: a failed read degrades to the
//! default toggles instead of failing the request.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use bizdesk_auth::StoreError;
use bizdesk_core::TenantId;

/// Which optional modules are enabled for a company.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleSettings {
    pub invoices: bool,
    pub clients: bool,
    pub catalogue: bool,
    pub reports: bool,
    pub tickets: bool,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            invoices: true,
            clients: true,
            catalogue: true,
            reports: true,
            tickets: true,
        }
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, company: TenantId) -> Result<Option<ModuleSettings>, StoreError>;

    async fn put(&self, company: TenantId, settings: ModuleSettings) -> Result<(), StoreError>;
}

/// Settings for `company`, falling back to defaults when absent or unreadable.
pub async fn load_or_default(store: &dyn SettingsStore, company: TenantId) -> ModuleSettings {
    match store.get(company).await {
        Ok(Some(settings)) => settings,
        Ok(None) => ModuleSettings::default(),
        Err(e) => {
            warn!(company_id = %company, error = %e, "module settings read failed; using defaults");
            ModuleSettings::default()
        }
    }
}

/// In-memory settings for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<HashMap<TenantId, ModuleSettings>>,
    unavailable: AtomicBool,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, company: TenantId) -> Result<Option<ModuleSettings>, StoreError> {
        self.ensure_available()?;
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(&company).copied())
    }

    async fn put(&self, company: TenantId, settings: ModuleSettings) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        map.insert(company, settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_settings_are_returned() {
        let store = InMemorySettingsStore::new();
        let company = TenantId::new();
        let settings = ModuleSettings {
            reports: false,
            ..Default::default()
        };
        store.put(company, settings).await.unwrap();

        assert_eq!(load_or_default(&store, company).await, settings);
        assert_eq!(
            load_or_default(&store, TenantId::new()).await,
            ModuleSettings::default()
        );
    }

    #[tokio::test]
    async fn read_failure_degrades_to_defaults() {
        let store = InMemorySettingsStore::new();
        let company = TenantId::new();
        store
            .put(
                company,
                ModuleSettings {
                    tickets: false,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        store.set_unavailable(true);
        assert_eq!(load_or_default(&store, company).await, ModuleSettings::default());
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let settings: ModuleSettings = serde_json::from_str(r#"{ "invoices": false }"#).unwrap();
        assert!(!settings.invoices);
        assert!(settings.tickets);
    }
}
