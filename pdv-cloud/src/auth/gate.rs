//! Login gate
//!
//! ```text
//! received -> tenant_lookup -> password_check -> expiration_evaluation -> session
//!                  |                 |                    |
//!          InvalidCredentials  InvalidCredentials   AccountBlocked(reason)
//! ```
//!
//! A login matching the reserved super-admin login is checked against the
//! reserved secret and never reaches the evaluator.

use shared::error::AppError;
use shared::util::normalize_login_key;

use crate::db::{self, tenants::Tenant};
use crate::error::ServiceResult;
use crate::lifecycle::{self, Checked, Verdict};
use crate::state::AppState;
use crate::util::verify_password;

/// Stage a login attempt stopped at, for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    TenantLookup,
    PasswordCheck,
    ExpirationEvaluation,
}

#[derive(Debug)]
pub enum LoginOutcome {
    SuperAdmin,
    Tenant(Tenant),
}

fn reject(stage: Stage, err: AppError) -> ServiceResult<LoginOutcome> {
    tracing::info!(?stage, code = %err.code, "Login rejected");
    Err(err.into())
}

/// Run one login attempt through the gate
pub async fn login(state: &AppState, raw_login: &str, password: &str) -> ServiceResult<LoginOutcome> {
    let raw_login = raw_login.trim();
    if raw_login.is_empty() || password.is_empty() {
        return reject(Stage::Received, AppError::invalid_credentials());
    }

    if raw_login == state.super_admin_login {
        if verify_password(password, &state.super_admin_password_hash) {
            tracing::info!("Super-admin login");
            return Ok(LoginOutcome::SuperAdmin);
        }
        return reject(Stage::PasswordCheck, AppError::invalid_credentials());
    }

    let login_key = normalize_login_key(raw_login);
    let Some(tenant) = db::tenants::find_by_login_key(&state.pool, &login_key).await? else {
        return reject(Stage::TenantLookup, AppError::invalid_credentials());
    };

    if !verify_password(password, &tenant.hashed_password) {
        return reject(Stage::PasswordCheck, AppError::invalid_credentials());
    }

    if !tenant.status.can_login() {
        return reject(
            Stage::ExpirationEvaluation,
            AppError::account_blocked(tenant.block_reason()),
        );
    }

    let now = state.now();
    let Checked { tenant, verdict } = lifecycle::check_tenant(&state.pool, tenant, now).await?;
    match verdict {
        Verdict::Block(reason) => reject(Stage::ExpirationEvaluation, AppError::account_blocked(reason)),
        Verdict::NoOp if !tenant.status.can_login() => reject(
            Stage::ExpirationEvaluation,
            AppError::account_blocked(tenant.block_reason()),
        ),
        Verdict::NoOp => {
            db::audit::record(&state.pool, &tenant.id, "login", None, now).await;
            Ok(LoginOutcome::Tenant(tenant))
        }
    }
}
