//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: identity provider, stores, session codec/verifier, edge gate
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;
use services::AppServices;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    // Page routes: the edge gate decides which of them need a session.
    let pages = routes::pages::router().layer(axum::middleware::from_fn_with_state(
        services.clone(),
        middleware::edge_gate_middleware,
    ));

    // JSON API behind a verified session cookie.
    let protected_api = routes::api_router().layer(axum::middleware::from_fn_with_state(
        services.clone(),
        middleware::require_session_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/auth", routes::session::router())
        .nest("/api", protected_api)
        .merge(pages)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
