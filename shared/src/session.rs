//! Login/signup request and session response types

use serde::{Deserialize, Serialize};

use crate::models::{BlockReason, Plan, TenantStatus};

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_key: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub login_key: String,
    pub shop_name: String,
    pub password: String,
}

/// Tenant as seen by a signed-in client. Never carries the password secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSession {
    pub id: String,
    pub login_key: String,
    pub shop_name: String,
    pub shop_logo: Option<String>,
    pub pix_key: Option<String>,
    pub plan: Plan,
    pub status: TenantStatus,
    pub blocked_reason: Option<BlockReason>,
    pub trial_ends_at: i64,
    pub created_at: i64,
    #[serde(default)]
    pub is_impersonating: bool,
}

/// Returned by login, signup and impersonate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Absent for the super-admin
    pub tenant: Option<TenantSession>,
    pub token: String,
    pub is_super_admin: bool,
}
