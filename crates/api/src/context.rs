use bizdesk_auth::{Role, VerifiedSession};
use bizdesk_core::IdentityId;

/// Session context for a request (verified identity + role).
///
/// Inserted by the gate middleware; immutable for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    identity_id: IdentityId,
    role: Role,
}

impl SessionContext {
    pub fn new(identity_id: IdentityId, role: Role) -> Self {
        Self { identity_id, role }
    }

    pub fn identity_id(&self) -> &IdentityId {
        &self.identity_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<VerifiedSession> for SessionContext {
    fn from(value: VerifiedSession) -> Self {
        Self::new(value.identity_id, value.role)
    }
}
