//! Route authorization gates.
//!
//! The edge gate runs before a protected page is served and only checks
//! session validity. The client gate evaluates a resolved profile against an
//! optional role allow-list; it is advisory and never a security boundary.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::AuthError;
use crate::resolver::ProfileState;
use crate::verifier::{SessionVerifier, VerifiedSession};
use crate::Role;

pub const LANDING_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Path prefixes served only behind a valid session.
pub const PROTECTED_PREFIXES: [&str; 5] =
    ["/dashboard", "/catalogue", "/invoices", "/clients", "/reports"];

/// Whether `path` falls under one of `prefixes` (segment-aligned).
pub fn is_protected_by(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| {
        path == prefix
            || path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge gate
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeGateState<'a> {
    NoSession,
    Verifying(&'a str),
    /// Terminal. `None` when the path bypasses verification.
    Allowed(Option<VerifiedSession>),
    /// Terminal. The caller redirects to [`LOGIN_PATH`].
    Denied,
}

/// Outcome handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Serve the requested route, with the session when one was verified.
    Continue(Option<VerifiedSession>),
    Redirect(&'static str),
}

pub struct EdgeGate {
    verifier: Arc<SessionVerifier>,
    protected: Vec<String>,
}

impl EdgeGate {
    pub fn new(verifier: Arc<SessionVerifier>) -> Self {
        Self::with_prefixes(verifier, PROTECTED_PREFIXES.iter().map(|p| p.to_string()))
    }

    pub fn with_prefixes(
        verifier: Arc<SessionVerifier>,
        prefixes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            verifier,
            protected: prefixes.into_iter().collect(),
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        is_protected_by(&self.protected, path)
    }

    /// Entry state for a request.
    pub fn start<'a>(&self, path: &str, session: Option<&'a str>) -> EdgeGateState<'a> {
        if !self.is_protected(path) {
            return EdgeGateState::Allowed(None);
        }
        match session.map(str::trim) {
            Some(token) if !token.is_empty() => EdgeGateState::Verifying(token),
            _ => EdgeGateState::NoSession,
        }
    }

    /// Advance one transition. Terminal states map to themselves.
    pub async fn step<'a>(
        &self,
        state: EdgeGateState<'a>,
        path: &str,
        now: DateTime<Utc>,
    ) -> EdgeGateState<'a> {
        match state {
            EdgeGateState::NoSession if path == LANDING_PATH => EdgeGateState::Allowed(None),
            EdgeGateState::NoSession => EdgeGateState::Denied,
            EdgeGateState::Verifying(token) => match self.verifier.verify(token, now).await {
                Ok(session) => EdgeGateState::Allowed(Some(session)),
                Err(AuthError::ConfigurationMissing(what)) => {
                    tracing::error!(%what, path, "edge gate cannot verify sessions");
                    EdgeGateState::Denied
                }
                Err(_) => EdgeGateState::Denied,
            },
            terminal => terminal,
        }
    }

    /// Run the gate to completion for one request.
    pub async fn evaluate(
        &self,
        path: &str,
        session: Option<&str>,
        now: DateTime<Utc>,
    ) -> EdgeDecision {
        let mut state = self.start(path, session);
        loop {
            match state {
                EdgeGateState::Allowed(session) => {
                    if let Some(s) = &session {
                        debug!(path, identity_id = %s.identity_id, role = %s.role, "edge gate allowed");
                    }
                    return EdgeDecision::Continue(session);
                }
                EdgeGateState::Denied => {
                    info!(path, "edge gate denied; redirecting to login");
                    return EdgeDecision::Redirect(LOGIN_PATH);
                }
                other => state = self.step(other, path, now).await,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client gate
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClientGateState {
    Loading,
    Unauthenticated,
    Unauthorized,
    Authorized,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClientGateAction {
    RenderNothing,
    Redirect(&'static str),
    RenderChildren,
}

#[derive(Debug, Clone, Default)]
pub struct ClientGate {
    allowed_roles: Option<Vec<Role>>,
}

impl ClientGate {
    pub fn new(allowed_roles: Option<Vec<Role>>) -> Self {
        Self { allowed_roles }
    }

    pub fn allowing(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::new(Some(roles.into_iter().collect()))
    }

    /// A failed profile fetch is treated exactly like a missing profile.
    pub fn evaluate(&self, state: &ProfileState) -> ClientGateState {
        if state.loading {
            return ClientGateState::Loading;
        }
        let Some(profile) = &state.profile else {
            return ClientGateState::Unauthenticated;
        };
        match &self.allowed_roles {
            Some(allowed) if !allowed.contains(&profile.role) => ClientGateState::Unauthorized,
            _ => ClientGateState::Authorized,
        }
    }

    pub fn action(state: ClientGateState) -> ClientGateAction {
        match state {
            ClientGateState::Loading => ClientGateAction::RenderNothing,
            ClientGateState::Unauthenticated => ClientGateAction::Redirect(LOGIN_PATH),
            ClientGateState::Unauthorized => ClientGateAction::Redirect(DASHBOARD_PATH),
            ClientGateState::Authorized => ClientGateAction::RenderChildren,
        }
    }

    pub fn decide(&self, state: &ProfileState) -> ClientGateAction {
        Self::action(self.evaluate(state))
    }
}
