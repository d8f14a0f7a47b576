//! API-side authorization guard for actions.
//!
//! This enforces the permission table at the handler boundary, before any
//! store is touched. The client gate's role allow-lists are advisory; this is
//! the check that counts.

use bizdesk_auth::{authorize_action, ActionAuthorization, AuthzError};

use crate::context::SessionContext;

/// Check authorization for an action in the current request context.
pub fn authorize_request<A: ActionAuthorization + ?Sized>(
    session: &SessionContext,
    action: &A,
) -> Result<(), AuthzError> {
    let result = authorize_action(session.role(), action);
    if let Err(e) = &result {
        tracing::info!(identity_id = %session.identity_id(), error = %e, "request denied");
    }
    result
}
