use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use bizdesk_auth::session::parse_cookie;
use bizdesk_auth::{
    AuthError, CookiePolicy, EdgeDecision, EdgeGate, Identity, Profile, ProfileStore, Role,
    SessionCodec, SessionVerifier,
};
use bizdesk_core::IdentityId;
use bizdesk_infra::{Hs256IdentityProvider, InMemoryProfileStore, UnconfiguredIdentityProvider};

struct Harness {
    provider: Arc<Hs256IdentityProvider>,
    profiles: Arc<InMemoryProfileStore>,
    codec: Arc<SessionCodec>,
    verifier: Arc<SessionVerifier>,
}

impl Harness {
    fn new() -> Self {
        let provider = Arc::new(Hs256IdentityProvider::new("flow-secret"));
        let profiles = Arc::new(InMemoryProfileStore::new());
        let codec = Arc::new(SessionCodec::new(provider.clone(), CookiePolicy::new(false)));
        let verifier = Arc::new(SessionVerifier::new(codec.clone(), profiles.clone()));
        Self {
            provider,
            profiles,
            codec,
            verifier,
        }
    }

    async fn with_profile(self, id: &str, role: Role) -> Self {
        self.profiles
            .save(&Profile::new(IdentityId::new(id).unwrap(), role))
            .await
            .unwrap();
        self
    }

    /// Assertion issued a moment ago, so it is already valid at any later `now`.
    fn id_token(&self, id: &str) -> String {
        let issued = Utc::now() - Duration::seconds(5);
        self.provider
            .mint_id_token(&Identity::new(IdentityId::new(id).unwrap()), issued)
            .unwrap()
    }
}

#[tokio::test]
async fn create_then_verify_returns_identity_and_stored_role() {
    let h = Harness::new().with_profile("u1", Role::Partner).await;
    let now = Utc::now();

    let artifact = h.codec.create_session(&h.id_token("u1"), now).await.unwrap();
    let session = h.verifier.verify(&artifact.token, now).await.unwrap();

    assert_eq!(session.identity_id.as_str(), "u1");
    assert_eq!(session.role, Role::Partner);
}

#[tokio::test]
async fn verify_reflects_role_changes_after_login() {
    let h = Harness::new().with_profile("u1", Role::Employee).await;
    let now = Utc::now();
    let artifact = h.codec.create_session(&h.id_token("u1"), now).await.unwrap();

    h.profiles
        .put(&IdentityId::new("u1").unwrap(), json!({ "role": "companyowner" }))
        .await
        .unwrap();

    let session = h.verifier.verify(&artifact.token, now).await.unwrap();
    assert_eq!(session.role, Role::CompanyOwner);
}

#[tokio::test]
async fn destroyed_session_no_longer_verifies() {
    let h = Harness::new().with_profile("u1", Role::Partner).await;
    let now = Utc::now();
    h.codec.create_session(&h.id_token("u1"), now).await.unwrap();

    let cleared = h.codec.destroy_session().to_header_value();
    let cookie_pair = cleared.split(';').next().unwrap();
    let value = parse_cookie(cookie_pair, "session").unwrap();

    assert_eq!(
        h.verifier.verify(value, now).await.unwrap_err(),
        AuthError::Unauthorized
    );
}

#[tokio::test]
async fn missing_profile_and_bad_token_look_the_same() {
    let h = Harness::new();
    let now = Utc::now();
    let artifact = h.codec.create_session(&h.id_token("nobody"), now).await.unwrap();

    assert_eq!(
        h.verifier.verify(&artifact.token, now).await.unwrap_err(),
        AuthError::Unauthorized
    );
    assert_eq!(
        h.verifier.verify("forged", now).await.unwrap_err(),
        AuthError::Unauthorized
    );
}

#[tokio::test]
async fn profile_without_role_is_rejected() {
    let h = Harness::new();
    h.profiles
        .put(&IdentityId::new("u2").unwrap(), json!({ "email": "u2@example.com" }))
        .await
        .unwrap();
    let now = Utc::now();
    let artifact = h.codec.create_session(&h.id_token("u2"), now).await.unwrap();

    assert_eq!(
        h.verifier.verify(&artifact.token, now).await.unwrap_err(),
        AuthError::Unauthorized
    );
}

#[tokio::test]
async fn store_outage_fails_closed() {
    let h = Harness::new().with_profile("u1", Role::Master).await;
    let now = Utc::now();
    let artifact = h.codec.create_session(&h.id_token("u1"), now).await.unwrap();

    h.profiles.set_unavailable(true);
    assert_eq!(
        h.verifier.verify(&artifact.token, now).await.unwrap_err(),
        AuthError::Unauthorized
    );
}

#[tokio::test]
async fn session_expires_after_five_days() {
    let h = Harness::new().with_profile("u1", Role::User).await;
    let now = Utc::now();
    let artifact = h.codec.create_session(&h.id_token("u1"), now).await.unwrap();

    let almost = now + Duration::seconds(432_000 - 1);
    assert!(h.verifier.verify(&artifact.token, almost).await.is_ok());

    let after = now + Duration::seconds(432_000);
    assert!(h.verifier.verify(&artifact.token, after).await.is_err());
}

#[tokio::test]
async fn unconfigured_provider_reports_configuration_missing() {
    let provider = Arc::new(UnconfiguredIdentityProvider::new("SESSION_SECRET"));
    let codec = SessionCodec::new(provider, CookiePolicy::new(true));

    assert_eq!(
        codec.create_session("anything", Utc::now()).await.unwrap_err(),
        AuthError::ConfigurationMissing("SESSION_SECRET".to_string())
    );
}

#[tokio::test]
async fn edge_gate_scenarios() {
    let h = Harness::new().with_profile("u1", Role::Partner).await;
    let gate = EdgeGate::new(h.verifier.clone());
    let now = Utc::now();

    assert_eq!(
        gate.evaluate("/dashboard/x", None, now).await,
        EdgeDecision::Redirect("/login")
    );
    assert_eq!(gate.evaluate("/", None, now).await, EdgeDecision::Continue(None));
    assert_eq!(
        gate.evaluate("/reports", Some(""), now).await,
        EdgeDecision::Redirect("/login")
    );
    assert_eq!(
        gate.evaluate("/clients/7", Some("forged"), now).await,
        EdgeDecision::Redirect("/login")
    );

    let artifact = h.codec.create_session(&h.id_token("u1"), now).await.unwrap();
    match gate.evaluate("/invoices/42", Some(&artifact.token), now).await {
        EdgeDecision::Continue(Some(session)) => {
            assert_eq!(session.identity_id.as_str(), "u1");
            assert_eq!(session.role, Role::Partner);
        }
        other => panic!("expected allowed with session, got {other:?}"),
    }
}
