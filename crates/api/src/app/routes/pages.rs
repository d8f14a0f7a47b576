//! Page routes. Rendering is the front-end's job; these answer with a small
//! JSON description of the page so the gate can be exercised end to end.

use axum::{
    extract::Extension,
    http::Uri,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use bizdesk_auth::gate::PROTECTED_PREFIXES;

use crate::context::SessionContext;

pub fn router() -> Router {
    let mut router = Router::new()
        .route("/", get(landing))
        .route("/login", get(login));

    for prefix in PROTECTED_PREFIXES {
        router = router
            .route(prefix, get(protected_page))
            .route(&format!("{prefix}/*rest"), get(protected_page));
    }

    router
}

pub async fn landing() -> impl IntoResponse {
    Json(serde_json::json!({ "page": "landing" }))
}

pub async fn login() -> impl IntoResponse {
    Json(serde_json::json!({ "page": "login" }))
}

/// Only reachable through the edge gate, which attaches the session.
pub async fn protected_page(
    uri: Uri,
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "page": uri.path(),
        "userId": session.identity_id().to_string(),
        "role": session.role(),
    }))
}
