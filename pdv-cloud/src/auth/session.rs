//! JWT session tokens for tenants and the super-admin

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tenant,
    SuperAdmin,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Tenant ID, or the super-admin login
    pub sub: String,
    pub role: Role,
    /// Issued to the super-admin acting as this tenant
    #[serde(default)]
    pub imp: bool,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity extracted from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
    pub impersonating: bool,
}

impl Identity {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Tenant sessions may only reach their own data; the super-admin reaches all
    pub fn can_access_tenant(&self, tenant_id: &str) -> bool {
        self.is_super_admin() || (self.role == Role::Tenant && self.subject == tenant_id)
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Sign a session token. Expiry uses wall-clock time.
pub fn create_token(
    subject: &str,
    role: Role,
    impersonating: bool,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = SessionClaims {
        sub: subject.to_string(),
        role,
        imp: impersonating,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Identity, AppError> {
    let token_data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired)
            }
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })?;

    Ok(Identity {
        subject: token_data.claims.sub,
        role: token_data.claims.role,
        impersonating: token_data.claims.imp,
    })
}

/// Middleware that verifies the bearer token and stores the [`Identity`]
/// in request extensions
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::invalid_token("Invalid Authorization format").into_response()
    })?;

    let identity = verify_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Middleware for the admin router; runs after [`session_middleware`]
pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, Response> {
    let is_admin = request
        .extensions()
        .get::<Identity>()
        .is_some_and(Identity::is_super_admin);
    if !is_admin {
        return Err(AppError::admin_required().into_response());
    }
    Ok(next.run(request).await)
}
