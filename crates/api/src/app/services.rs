//! Service wiring: identity provider, stores, codec, verifier, gate.
//!
//! Everything is built once at startup and shared read-only through an
//! `Arc<AppServices>`; there is no process-wide mutable auth state.

use std::sync::Arc;

use bizdesk_auth::{
    CookiePolicy, EdgeGate, IdentityProvider, ProfileStore, SessionCodec, SessionVerifier,
};
use bizdesk_infra::{
    Hs256IdentityProvider, InMemoryProfileStore, InMemorySettingsStore, SettingsStore,
    UnconfiguredIdentityProvider,
};

use crate::config::AppConfig;

pub struct AppServices {
    pub codec: Arc<SessionCodec>,
    pub verifier: Arc<SessionVerifier>,
    pub gate: Arc<EdgeGate>,
    pub profiles: Arc<dyn ProfileStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl AppServices {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        settings: Arc<dyn SettingsStore>,
        policy: CookiePolicy,
    ) -> Self {
        let codec = Arc::new(SessionCodec::new(provider, policy));
        let verifier = Arc::new(SessionVerifier::new(codec.clone(), profiles.clone()));
        let gate = Arc::new(EdgeGate::new(verifier.clone()));
        Self {
            codec,
            verifier,
            gate,
            profiles,
            settings,
        }
    }
}

/// Identity provider for the configured secret, or a stand-in that reports
/// the missing configuration on every call.
pub fn identity_provider(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    match &config.session_secret {
        Some(secret) => Arc::new(Hs256IdentityProvider::new(secret)),
        None => {
            tracing::warn!("SESSION_SECRET not set; session endpoints will answer 500");
            Arc::new(UnconfiguredIdentityProvider::new("SESSION_SECRET"))
        }
    }
}

/// Build services for the running process.
///
/// With the `postgres` feature and `DATABASE_URL` set, profiles are stored in
/// Postgres; otherwise everything is in memory (dev).
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let provider = identity_provider(config);
    let profiles = profile_store(config).await?;
    let settings: Arc<dyn SettingsStore> = Arc::new(InMemorySettingsStore::new());

    Ok(AppServices::new(
        provider,
        profiles,
        settings,
        config.cookie_policy(),
    ))
}

#[cfg(feature = "postgres")]
async fn profile_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProfileStore>> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; using in-memory profile store");
        return Ok(Arc::new(InMemoryProfileStore::new()));
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;
    let store = bizdesk_infra::PostgresProfileStore::new(pool);
    store.migrate().await?;
    tracing::info!("using postgres profile store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn profile_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProfileStore>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without the `postgres` feature");
    }
    tracing::info!("using in-memory profile store");
    Ok(Arc::new(InMemoryProfileStore::new()))
}
