use axum::{routing::get, Router};

pub mod common;
pub mod pages;
pub mod profiles;
pub mod rbac;
pub mod session;
pub mod settings;
pub mod system;

/// Router for all session-authenticated JSON endpoints (mounted under `/api`).
pub fn api_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/profile", get(profiles::get_my_profile))
        .nest("/profiles", profiles::router())
        .nest("/rbac", rbac::router())
        .nest("/settings", settings::router())
}
