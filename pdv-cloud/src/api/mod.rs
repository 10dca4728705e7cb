//! API routes for pdv-cloud

pub mod admin;
pub mod auth;
pub mod health;
pub mod tenant;

use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::session::{require_super_admin, session_middleware};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Create the combined router
pub fn build_app(state: AppState) -> Router {
    // Tenant data (bearer token)
    let tenant = tenant::router().layer(middleware::from_fn_with_state(
        state.clone(),
        session_middleware,
    ));

    // Super-admin only; the session layer is outermost so it runs first
    let admin = admin::router()
        .layer(middleware::from_fn(require_super_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(tenant)
        .merge(admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
