//! Login and signup

use axum::{Json, Router, extract::State, routing::post};
use shared::error::{AppError, ErrorCode};
use shared::session::{LoginRequest, MIN_PASSWORD_LEN, SessionResponse, SignupRequest};
use shared::util::{MILLIS_PER_DAY, normalize_login_key};

use crate::auth::gate::{self, LoginOutcome};
use crate::auth::session::{Role, create_token};
use crate::db;
use crate::state::AppState;
use crate::util::hash_password;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
}

fn sign(state: &AppState, subject: &str, role: Role, impersonating: bool) -> Result<String, AppError> {
    create_token(subject, role, impersonating, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    match gate::login(&state, &req.login_key, &req.password).await? {
        LoginOutcome::SuperAdmin => Ok(Json(SessionResponse {
            tenant: None,
            token: sign(&state, &state.super_admin_login, Role::SuperAdmin, false)?,
            is_super_admin: true,
        })),
        LoginOutcome::Tenant(tenant) => Ok(Json(SessionResponse {
            token: sign(&state, &tenant.id, Role::Tenant, false)?,
            tenant: Some(tenant.session(false)),
            is_super_admin: false,
        })),
    }
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<SessionResponse> {
    let login_key = normalize_login_key(&req.login_key);
    let shop_name = req.shop_name.trim();

    if login_key.is_empty() {
        return Err(AppError::validation("Login key must contain digits").with_detail("field", "loginKey"));
    }
    if shop_name.is_empty() {
        return Err(AppError::validation("Shop name is required").with_detail("field", "shopName"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }

    let hashed_password = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hash error: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let now = state.now();
    let tenant = db::tenants::create(
        &state.pool,
        &db::tenants::NewTenant {
            login_key: &login_key,
            shop_name,
            hashed_password: &hashed_password,
            trial_ends_at: now + state.trial_duration_days * MILLIS_PER_DAY,
            now,
        },
    )
    .await?;

    tracing::info!(tenant_id = %tenant.id, "Tenant signed up");
    db::audit::record(&state.pool, &tenant.id, "signup", None, now).await;

    Ok(Json(SessionResponse {
        token: sign(&state, &tenant.id, Role::Tenant, false)?,
        tenant: Some(tenant.session(false)),
        is_super_admin: false,
    }))
}
