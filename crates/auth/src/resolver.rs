//! Profile resolver: follows the signed-in identity and publishes its profile.
//!
//! Input is an explicit auth-state channel ([`AuthStateFeed`]); output is a
//! `watch` channel of [`ProfileState`]. Dropping the [`ProfileResolver`]
//! cancels the subscription.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::profile::Profile;
use crate::provider::Identity;
use crate::store::{ProfileLoadError, ProfileStore};

/// Published view of the current identity's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProfileState {
    pub fn loading() -> Self {
        Self {
            profile: None,
            loading: true,
            error: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            profile: None,
            loading: false,
            error: None,
        }
    }

    fn settled(result: Result<Option<Profile>, ProfileLoadError>, identity: &Identity) -> Self {
        match result {
            Ok(profile) => Self {
                profile,
                loading: false,
                error: None,
            },
            Err(e) => {
                warn!(identity_id = %identity.id, error = %e, "profile fetch failed");
                Self {
                    profile: None,
                    loading: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Source of identity-provider state changes (sign-in / sign-out).
#[derive(Debug)]
pub struct AuthStateFeed {
    tx: watch::Sender<Option<Identity>>,
}

impl AuthStateFeed {
    pub fn new(initial: Option<Identity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn sign_in(&self, identity: Identity) {
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

impl Default for AuthStateFeed {
    fn default() -> Self {
        Self::new(None)
    }
}

pub struct ProfileResolver {
    state: watch::Receiver<ProfileState>,
    task: JoinHandle<()>,
}

impl ProfileResolver {
    /// Start following `auth`. Must be called inside a Tokio runtime.
    pub fn spawn(auth: watch::Receiver<Option<Identity>>, store: Arc<dyn ProfileStore>) -> Self {
        let (tx, state) = watch::channel(ProfileState::loading());
        let task = tokio::spawn(run(auth, store, tx));
        Self { state, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.clone()
    }

    pub fn current(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    /// Stop following auth state. Equivalent to dropping the resolver.
    pub fn shutdown(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ProfileResolver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut auth: watch::Receiver<Option<Identity>>,
    store: Arc<dyn ProfileStore>,
    tx: watch::Sender<ProfileState>,
) {
    loop {
        let current = auth.borrow_and_update().clone();

        let next = match current {
            None => ProfileState::signed_out(),
            Some(identity) => {
                tx.send_replace(ProfileState::loading());
                tokio::select! {
                    changed = auth.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        // Identity changed mid-fetch; start over with the latest one.
                        continue;
                    }
                    result = store.load(&identity.id) => ProfileState::settled(result, &identity),
                }
            }
        };

        debug!(
            has_profile = next.profile.is_some(),
            failed = next.error.is_some(),
            "profile state settled"
        );
        tx.send_replace(next);

        if auth.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::Role;
    use async_trait::async_trait;
    use bizdesk_core::IdentityId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        docs: Mutex<HashMap<IdentityId, serde_json::Value>>,
        fail: bool,
    }

    #[async_trait]
    impl ProfileStore for MapStore {
        async fn get(&self, id: &IdentityId) -> Result<Option<serde_json::Value>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("offline".into()));
            }
            Ok(self.docs.lock().unwrap().get(id).cloned())
        }

        async fn put(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError> {
            self.docs.lock().unwrap().insert(id.clone(), document);
            Ok(())
        }

        async fn create(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError> {
            self.put(id, document).await
        }
    }

    fn identity(id: &str) -> Identity {
        Identity::new(IdentityId::new(id).unwrap())
    }

    #[tokio::test]
    async fn publishes_profile_after_sign_in_and_clears_on_sign_out() {
        let store = Arc::new(MapStore::default());
        store
            .put(&IdentityId::new("u1").unwrap(), serde_json::json!({ "role": "partner" }))
            .await
            .unwrap();

        let feed = AuthStateFeed::default();
        let resolver = ProfileResolver::spawn(feed.subscribe(), store);
        let mut rx = resolver.subscribe();

        rx.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(resolver.current(), ProfileState::signed_out());

        feed.sign_in(identity("u1"));
        let state = rx
            .wait_for(|s| !s.loading && s.profile.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(state.profile.unwrap().role, Role::Partner);

        feed.sign_out();
        rx.wait_for(|s| !s.loading && s.profile.is_none()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_profile_settles_to_none_without_error() {
        let feed = AuthStateFeed::new(Some(identity("ghost")));
        let resolver = ProfileResolver::spawn(feed.subscribe(), Arc::new(MapStore::default()));
        let mut rx = resolver.subscribe();

        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert!(state.profile.is_none());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn read_failure_sets_error_flag_instead_of_failing() {
        let store = Arc::new(MapStore {
            fail: true,
            ..Default::default()
        });
        let feed = AuthStateFeed::new(Some(identity("u1")));
        let resolver = ProfileResolver::spawn(feed.subscribe(), store);
        let mut rx = resolver.subscribe();

        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert!(state.profile.is_none());
        assert!(state.error.unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn invalid_document_is_reported_as_error() {
        let store = Arc::new(MapStore::default());
        store
            .put(&IdentityId::new("u1").unwrap(), serde_json::json!({ "email": "a@b.c" }))
            .await
            .unwrap();
        let feed = AuthStateFeed::new(Some(identity("u1")));
        let resolver = ProfileResolver::spawn(feed.subscribe(), store);
        let mut rx = resolver.subscribe();

        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert!(state.profile.is_none());
        assert!(state.error.is_some());
    }

    /// Blocks forever when reading `slow`; answers every other id from `docs`.
    struct SlowStore {
        slow: IdentityId,
        started: tokio::sync::Notify,
        docs: HashMap<IdentityId, serde_json::Value>,
    }

    #[async_trait]
    impl ProfileStore for SlowStore {
        async fn get(&self, id: &IdentityId) -> Result<Option<serde_json::Value>, StoreError> {
            if *id == self.slow {
                self.started.notify_one();
                return std::future::pending().await;
            }
            Ok(self.docs.get(id).cloned())
        }

        async fn put(&self, _id: &IdentityId, _document: serde_json::Value) -> Result<(), StoreError> {
            Ok(())
        }

        async fn create(&self, _id: &IdentityId, _document: serde_json::Value) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn identity_change_mid_fetch_settles_on_latest_identity() {
        let b = IdentityId::new("b").unwrap();
        let store = Arc::new(SlowStore {
            slow: IdentityId::new("a").unwrap(),
            started: tokio::sync::Notify::new(),
            docs: HashMap::from([(b.clone(), serde_json::json!({ "role": "employee" }))]),
        });

        let feed = AuthStateFeed::new(Some(identity("a")));
        let resolver = ProfileResolver::spawn(feed.subscribe(), store.clone());
        let mut rx = resolver.subscribe();

        store.started.notified().await;
        assert!(resolver.current().loading);

        feed.sign_in(identity("b"));
        let state = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            rx.wait_for(|s| !s.loading),
        )
        .await
        .expect("resolver stayed on the stale fetch")
        .unwrap()
        .clone();

        let profile = state.profile.unwrap();
        assert_eq!(profile.id, b);
        assert_eq!(profile.role, Role::Employee);
    }

    async fn assert_publisher_closed(mut rx: watch::Receiver<ProfileState>) {
        let closed = tokio::time::timeout(std::time::Duration::from_secs(5), rx.changed())
            .await
            .expect("resolver task still running");
        assert!(closed.is_err());
    }

    #[tokio::test]
    async fn shutdown_cancels_the_subscription_task() {
        let feed = AuthStateFeed::new(Some(identity("u1")));
        let resolver = ProfileResolver::spawn(feed.subscribe(), Arc::new(MapStore::default()));
        let mut rx = resolver.subscribe();
        rx.wait_for(|s| !s.loading).await.unwrap();

        resolver.shutdown();
        assert_publisher_closed(rx).await;

        // The feed outlives the resolver and keeps working.
        feed.sign_out();
    }

    #[tokio::test]
    async fn dropping_the_resolver_cancels_the_subscription_task() {
        let feed = AuthStateFeed::default();
        let resolver = ProfileResolver::spawn(feed.subscribe(), Arc::new(MapStore::default()));
        let mut rx = resolver.subscribe();
        rx.wait_for(|s| !s.loading).await.unwrap();

        drop(resolver);
        assert_publisher_closed(rx).await;
        feed.sign_in(identity("u1"));
    }

    #[tokio::test]
    async fn task_ends_when_auth_feed_is_dropped() {
        let feed = AuthStateFeed::default();
        let resolver = ProfileResolver::spawn(feed.subscribe(), Arc::new(MapStore::default()));
        drop(feed);

        for _ in 0..100 {
            if resolver.is_finished() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("resolver task did not stop after its auth feed closed");
    }
}
