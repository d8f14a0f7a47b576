//! RBAC audit endpoints for transparent authorization debugging.
//!
//! These endpoints expose the static permission table and explain
//! decisions, to answer "why was this request denied?".

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use bizdesk_auth::{explain_authorization, RbacRegistry};

use crate::app::dto::ExplainQuery;
use crate::app::errors;
use crate::app::routes::common::MANAGE_USERS;
use crate::authz;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/permissions", get(list_permissions))
        .route("/explain", get(explain_authorization_decision))
}

/// GET /api/rbac/roles - List all roles and their permissions
pub async fn list_roles(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    if let Err(e) = authz::authorize_request(&session, &MANAGE_USERS) {
        return errors::authz_error_to_response(e);
    }

    let registry = RbacRegistry::build();
    let roles: Vec<_> = registry.roles.into_values().collect();
    (StatusCode::OK, Json(serde_json::json!({ "roles": roles }))).into_response()
}

/// GET /api/rbac/permissions - List all permissions and the roles granting them
pub async fn list_permissions(
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_request(&session, &MANAGE_USERS) {
        return errors::authz_error_to_response(e);
    }

    let registry = RbacRegistry::build();
    let permissions: Vec<_> = registry.permissions.into_values().collect();
    (StatusCode::OK, Json(serde_json::json!({ "permissions": permissions }))).into_response()
}

/// GET /api/rbac/explain?permission=X - Explain the caller's access to a permission
pub async fn explain_authorization_decision(
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ExplainQuery>,
) -> axum::response::Response {
    // Any authenticated user may check their own permissions.
    let explanation = explain_authorization(session.role().as_str(), &query.permission);
    (StatusCode::OK, Json(serde_json::json!({ "explanation": explanation }))).into_response()
}
