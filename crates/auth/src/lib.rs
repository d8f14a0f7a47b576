//! `bizdesk-auth`: RBAC and session verification.
//!
//! This crate is intentionally decoupled from HTTP and storage: the identity
//! provider and the profile store are traits implemented elsewhere.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod gate;
pub mod permissions;
pub mod profile;
pub mod provider;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod store;
pub mod verifier;

pub use authorize::{
    authorize, authorize_action, explain_authorization, ActionAuthorization,
    AuthorizationExplanation, AuthzError, RbacRegistry,
};
pub use claims::{validate_claims, TokenClaims, TokenUse, TokenValidationError};
pub use error::AuthError;
pub use gate::{ClientGate, ClientGateAction, ClientGateState, EdgeDecision, EdgeGate};
pub use permissions::{has_permission, has_permission_str, permissions_for, Permission};
pub use profile::{Profile, ProfileAttributes, ProfileError};
pub use provider::{Identity, IdentityProvider, IdentityProviderError};
pub use resolver::{AuthStateFeed, ProfileResolver, ProfileState};
pub use roles::Role;
pub use session::{CookiePolicy, SessionArtifact, SessionCodec, SessionCookie};
pub use store::{ProfileLoadError, ProfileStore, StoreError};
pub use verifier::{SessionVerifier, VerifiedSession};
