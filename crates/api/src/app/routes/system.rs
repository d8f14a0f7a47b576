use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use bizdesk_auth::permissions_for;

use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "userId": session.identity_id().to_string(),
        "role": session.role(),
        "permissions": permissions_for(session.role()),
    }))
}
