//! Profile endpoints: the caller's own profile, invitations, role changes.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};

use bizdesk_auth::{
    permissions_for, Profile, ProfileAttributes, ProfileLoadError, ProfileStore, Role, StoreError,
};
use bizdesk_core::IdentityId;

use crate::app::routes::common::MANAGE_USERS;
use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(invite_profile))
        .route("/:id/role", put(change_role))
}

/// Load the caller's own profile; any failure means the session is no longer usable.
async fn load_caller(
    services: &AppServices,
    session: &SessionContext,
) -> Result<Profile, axum::response::Response> {
    match services.profiles.load(session.identity_id()).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) | Err(ProfileLoadError::Invalid(_)) => {
            Err(errors::error_body(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        Err(ProfileLoadError::Store(e)) => Err(errors::store_error_to_response(e)),
    }
}

/// Only a master may hand out the master role.
fn ensure_can_grant(caller: Role, role: Role) -> Result<(), axum::response::Response> {
    if role == Role::Master && caller != Role::Master {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only a master can grant the master role",
        ));
    }
    Ok(())
}

/// GET /api/profile - the caller's profile and effective permissions
pub async fn get_my_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let profile = match load_caller(&services, &session).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let permissions = permissions_for(profile.role).to_vec();
    (StatusCode::OK, Json(dto::ProfileResponse { profile, permissions })).into_response()
}

/// POST /api/profiles - invite a user by creating their profile
pub async fn invite_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::InviteProfileRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_request(&session, &MANAGE_USERS) {
        return errors::authz_error_to_response(e);
    }
    if let Err(resp) = ensure_can_grant(session.role(), body.role) {
        return resp;
    }

    let id = match IdentityId::new(body.id) {
        Ok(id) => id,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()),
    };

    let caller = match load_caller(&services, &session).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    // Company owners invite into their own company; masters choose.
    let company_id = if caller.role == Role::Master {
        body.company_id
    } else {
        caller.attributes.company_id
    };

    let profile = Profile {
        id,
        role: body.role,
        attributes: ProfileAttributes {
            email: body.email,
            display_name: body.display_name,
            company_id,
            extra: Default::default(),
        },
    };

    match services.profiles.create(&profile.id, profile.to_document()).await {
        Ok(()) => {}
        // Same answer whichever company holds the existing profile.
        Err(StoreError::AlreadyExists) if caller.role != Role::Master => {
            tracing::info!(
                invited = %profile.id,
                by = %session.identity_id(),
                "invitation refused: identity already has a profile"
            );
            return errors::json_error(
                StatusCode::CONFLICT,
                "not_invitable",
                "this identity cannot be invited",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    tracing::info!(
        invited = %profile.id,
        role = %profile.role,
        by = %session.identity_id(),
        "profile created by invitation"
    );

    (StatusCode::CREATED, Json(serde_json::json!({ "profile": profile }))).into_response()
}

/// PUT /api/profiles/:id/role - change a user's role (last write wins)
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ChangeRoleRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_request(&session, &MANAGE_USERS) {
        return errors::authz_error_to_response(e);
    }
    if let Err(resp) = ensure_can_grant(session.role(), body.role) {
        return resp;
    }

    let id = match IdentityId::new(id) {
        Ok(id) => id,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()),
    };

    let caller = match load_caller(&services, &session).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let mut target = match services.profiles.load(&id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "profile not found"),
        Err(ProfileLoadError::Invalid(e)) => {
            return errors::json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_profile", e.to_string());
        }
        Err(ProfileLoadError::Store(e)) => return errors::store_error_to_response(e),
    };

    if caller.role != Role::Master {
        // Tenant isolation: outside their company, a profile does not exist for them.
        if target.attributes.company_id.is_none()
            || target.attributes.company_id != caller.attributes.company_id
        {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "profile not found");
        }
        if target.role == Role::Master {
            return errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "only a master can change a master's role",
            );
        }
    }

    let previous = target.role;
    target.role = body.role;
    if let Err(e) = services.profiles.save(&target).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(
        profile_id = %target.id,
        from = %previous,
        to = %target.role,
        by = %session.identity_id(),
        "role changed"
    );

    (StatusCode::OK, Json(serde_json::json!({ "profile": target }))).into_response()
}
