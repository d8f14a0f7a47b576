use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bizdesk_auth::{AuthError, AuthzError, StoreError};

/// Structured error for API routes: `{ "error": code, "message": ... }`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Bare `{ "error": message }` body used by the session endpoints.
pub fn error_body(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

/// Map a session-flow error; `unauthorized` is the endpoint's 401 message.
pub fn auth_error_to_response(err: AuthError, unauthorized: &'static str) -> axum::response::Response {
    match err {
        AuthError::Unauthorized => error_body(StatusCode::UNAUTHORIZED, unauthorized),
        AuthError::ConfigurationMissing(what) => {
            tracing::error!(%what, "request failed: configuration missing");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration missing: {what}"),
            )
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::AlreadyExists => json_error(StatusCode::CONFLICT, "conflict", "profile already exists"),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "document store unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
    }
}
