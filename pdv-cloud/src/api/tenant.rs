//! Tenant snapshot endpoints (full-replace sync)

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::AppError;
use shared::{SnapshotPatch, TenantSnapshot};

use crate::auth::Identity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/tenant/{id}", get(get_snapshot).post(push_snapshot))
}

/// The caller may reach this tenant's data.
///
/// Plain tenant sessions of a blocked tenant are refused; the super-admin
/// and impersonation sessions are not.
async fn authorize(state: &AppState, identity: &Identity, tenant_id: &str) -> Result<(), AppError> {
    if !identity.can_access_tenant(tenant_id) {
        return Err(AppError::permission_denied("Cannot access another tenant"));
    }
    let tenant = db::tenants::get(&state.pool, tenant_id).await?;
    if !identity.is_super_admin() && !identity.impersonating && !tenant.status.can_login() {
        return Err(AppError::account_blocked(tenant.block_reason()));
    }
    Ok(())
}

/// GET /tenant/{id}
pub async fn get_snapshot(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(tenant_id): Path<String>,
) -> ApiResult<TenantSnapshot> {
    authorize(&state, &identity, &tenant_id).await?;
    let snapshot = db::snapshot::load(&state.pool, &tenant_id).await?;
    Ok(Json(snapshot))
}

/// POST /tenant/{id}
pub async fn push_snapshot(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(tenant_id): Path<String>,
    Json(patch): Json<SnapshotPatch>,
) -> ApiResult<serde_json::Value> {
    authorize(&state, &identity, &tenant_id).await?;

    db::snapshot::apply(&state.pool, &tenant_id, &patch).await?;

    tracing::debug!(
        tenant_id = %tenant_id,
        products = patch.products.as_ref().map(Vec::len),
        sales = patch.sales.as_ref().map(Vec::len),
        "Snapshot applied"
    );
    db::audit::record(
        &state.pool,
        &tenant_id,
        "sync_push",
        Some(serde_json::json!({
            "products": patch.products.as_ref().map(Vec::len),
            "sales": patch.sales.as_ref().map(Vec::len),
            "settings": patch.settings.is_some(),
        })),
        state.now(),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true })))
}
