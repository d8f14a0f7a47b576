use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use bizdesk_auth::session::parse_cookie;
use bizdesk_auth::EdgeDecision;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// Edge gate for page routes: protected prefixes need a verified session.
///
/// Denials redirect to the login page; role allow-lists are not checked here.
pub async fn edge_gate_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let cookie = session_cookie(req.headers(), &services.codec.policy().name);

    match services
        .gate
        .evaluate(&path, cookie.as_deref(), Utc::now())
        .await
    {
        EdgeDecision::Continue(session) => {
            if let Some(session) = session {
                req.extensions_mut().insert(SessionContext::from(session));
            }
            next.run(req).await
        }
        EdgeDecision::Redirect(to) => Redirect::temporary(to).into_response(),
    }
}

/// Session guard for JSON API routes: 401 instead of a redirect.
pub async fn require_session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = session_cookie(req.headers(), &services.codec.policy().name) else {
        return errors::error_body(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    match services.verifier.verify(&token, Utc::now()).await {
        Ok(session) => {
            req.extensions_mut().insert(SessionContext::from(session));
            next.run(req).await
        }
        Err(e) => errors::auth_error_to_response(e, "Unauthorized"),
    }
}

/// Extract the session cookie value from the request headers.
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| parse_cookie(h, name))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

