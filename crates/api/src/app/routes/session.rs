//! Session endpoints: login, logout, verification.
//!
//! Response bodies are a fixed contract with the front-end:
//! - `POST /session` → `{status:"success"}` + Set-Cookie, or 401 `{error:"Unauthorized"}`
//! - `DELETE /session` → `{status:"success"}` with a cleared cookie
//! - `POST /verify` → `{role, userId}`, or 401 `{error:"Session invalide"}`

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::app::{dto, errors, services::AppServices};

const UNAUTHORIZED: &str = "Unauthorized";
const INVALID_SESSION: &str = "Session invalide";

pub fn router() -> Router {
    Router::new()
        .route("/session", post(create_session).delete(destroy_session))
        .route("/verify", post(verify_session))
}

/// POST /api/auth/session - exchange an identity assertion for a session cookie
pub async fn create_session(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let request: dto::CreateSessionRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return errors::error_body(StatusCode::UNAUTHORIZED, UNAUTHORIZED),
    };

    let artifact = match services
        .codec
        .create_session(&request.id_token, Utc::now())
        .await
    {
        Ok(a) => a,
        Err(e) => return errors::auth_error_to_response(e, UNAUTHORIZED),
    };

    let cookie = match HeaderValue::from_str(&artifact.cookie.to_header_value()) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "session cookie is not a valid header value");
            return errors::error_body(StatusCode::INTERNAL_SERVER_ERROR, "Cookie invalide");
        }
    };

    tracing::info!(identity_id = %artifact.identity.id, "session created");

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(dto::StatusResponse::success()),
    )
        .into_response()
}

/// DELETE /api/auth/session - clear the session cookie (idempotent)
pub async fn destroy_session(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let cleared = services.codec.destroy_session();

    match HeaderValue::from_str(&cleared.to_header_value()) {
        Ok(cookie) => (
            StatusCode::OK,
            [(header::SET_COOKIE, cookie)],
            Json(dto::StatusResponse::success()),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to clear session cookie");
            errors::error_body(StatusCode::INTERNAL_SERVER_ERROR, "Erreur lors de la déconnexion")
        }
    }
}

/// POST /api/auth/verify - verify a session artifact and resolve its role
pub async fn verify_session(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let request: dto::VerifySessionRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return errors::error_body(StatusCode::UNAUTHORIZED, INVALID_SESSION),
    };

    match services.verifier.verify(&request.session, Utc::now()).await {
        Ok(session) => (
            StatusCode::OK,
            Json(dto::VerifySessionResponse {
                role: session.role,
                user_id: session.identity_id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e, INVALID_SESSION),
    }
}
