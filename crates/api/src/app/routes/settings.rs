//! Module settings. Reads degrade to defaults; writes need `manage_settings`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use bizdesk_auth::{ProfileLoadError, ProfileStore, Role};
use bizdesk_core::TenantId;
use bizdesk_infra::settings::load_or_default;
use bizdesk_infra::{ModuleSettings, SettingsStore};

use crate::app::dto::SettingsQuery;
use crate::app::routes::common::MANAGE_SETTINGS;
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/modules", get(get_modules).put(put_modules))
}

/// The company the caller acts for. Masters pick one with `?companyId=`.
async fn resolve_company(
    services: &AppServices,
    session: &SessionContext,
    query: &SettingsQuery,
) -> Result<TenantId, axum::response::Response> {
    let profile = match services.profiles.load(session.identity_id()).await {
        Ok(Some(p)) => p,
        Ok(None) | Err(ProfileLoadError::Invalid(_)) => {
            return Err(errors::error_body(StatusCode::UNAUTHORIZED, "Unauthorized"));
        }
        Err(ProfileLoadError::Store(e)) => return Err(errors::store_error_to_response(e)),
    };

    let company = match (profile.role, query.company_id) {
        (Role::Master, Some(requested)) => Some(requested),
        _ => profile.attributes.company_id,
    };

    company.ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "no_company",
            "no company associated with this account",
        )
    })
}

/// GET /api/settings/modules
pub async fn get_modules(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<SettingsQuery>,
) -> axum::response::Response {
    let company = match resolve_company(&services, &session, &query).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let settings = load_or_default(services.settings.as_ref(), company).await;
    (StatusCode::OK, Json(settings)).into_response()
}

/// PUT /api/settings/modules
pub async fn put_modules(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<SettingsQuery>,
    Json(body): Json<ModuleSettings>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_request(&session, &MANAGE_SETTINGS) {
        return errors::authz_error_to_response(e);
    }

    let company = match resolve_company(&services, &session, &query).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    if let Err(e) = services.settings.put(company, body).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(company_id = %company, by = %session.identity_id(), "module settings updated");
    (StatusCode::OK, Json(body)).into_response()
}
