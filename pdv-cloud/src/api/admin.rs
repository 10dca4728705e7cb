//! Super-admin control surface

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use shared::admin::{
    AdminStats, CreateChargeRequest, SweepReport, TenantSummary, TenantUpdate,
    UpdateSubscriptionRequest,
};
use shared::error::{AppError, ErrorCode};
use shared::session::SessionResponse;
use shared::{BlockReason, Subscription, SubscriptionStatus};
use rust_decimal::prelude::ToPrimitive;

use crate::auth::session::{Role, create_token};
use crate::db;
use crate::lifecycle;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/tenants", get(list_tenants))
        .route(
            "/admin/tenant/{id}",
            get(get_tenant).put(update_tenant).delete(delete_tenant),
        )
        .route("/admin/tenant/{id}/subscriptions", get(list_subscriptions))
        .route("/admin/tenant/{id}/audit", get(audit_log))
        .route("/admin/tenant/{id}/block", post(block_tenant))
        .route("/admin/tenant/{id}/unblock", post(unblock_tenant))
        .route("/admin/subscription", post(create_charge))
        .route("/admin/subscription/{id}", put(update_subscription))
        .route("/admin/check-expirations", get(check_expirations))
        .route("/admin/impersonate/{id}", post(impersonate))
        .route("/admin/stats", get(stats))
}

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// GET /admin/tenants?q=
pub async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<TenantSummary>> {
    let tenants = db::tenants::list(&state.pool, query.q.as_deref()).await?;
    Ok(Json(tenants.iter().map(|t| t.summary()).collect()))
}

/// GET /admin/tenant/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<TenantSummary> {
    let tenant = db::tenants::get(&state.pool, &tenant_id).await?;
    Ok(Json(tenant.summary()))
}

/// PUT /admin/tenant/{id}: plan, status and branding changes
pub async fn update_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(patch): Json<TenantUpdate>,
) -> ApiResult<serde_json::Value> {
    db::tenants::update(&state.pool, &tenant_id, &patch).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        plan = ?patch.plan,
        status = ?patch.status,
        "Tenant updated by admin"
    );
    db::audit::record(
        &state.pool,
        &tenant_id,
        "admin_update",
        serde_json::to_value(&patch).ok(),
        state.now(),
    )
    .await;

    Ok(success())
}

/// DELETE /admin/tenant/{id}
pub async fn delete_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<serde_json::Value> {
    db::tenants::delete(&state.pool, &tenant_id).await?;
    tracing::info!(tenant_id = %tenant_id, "Tenant deleted");
    db::audit::record(&state.pool, &tenant_id, "tenant_deleted", None, state.now()).await;
    Ok(success())
}

/// GET /admin/tenant/{id}/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Vec<Subscription>> {
    db::tenants::get(&state.pool, &tenant_id).await?;
    let subs = db::subscriptions::list_for_tenant(&state.pool, &tenant_id).await?;
    Ok(Json(subs))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/tenant/{id}/audit?limit=&offset=
pub async fn audit_log(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<db::audit::AuditEntry>> {
    let limit = page.limit.unwrap_or(50).clamp(1, 500);
    let offset = page.offset.unwrap_or(0).max(0);
    let entries = db::audit::query(&state.pool, &tenant_id, limit, offset).await?;
    Ok(Json(entries))
}

/// POST /admin/tenant/{id}/block
pub async fn block_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<serde_json::Value> {
    db::tenants::set_blocked(&state.pool, &tenant_id, BlockReason::AdminBlocked).await?;
    tracing::info!(tenant_id = %tenant_id, "Tenant blocked by admin");
    db::audit::record(&state.pool, &tenant_id, "admin_blocked", None, state.now()).await;
    Ok(success())
}

/// POST /admin/tenant/{id}/unblock
pub async fn unblock_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<serde_json::Value> {
    db::tenants::set_active(&state.pool, &tenant_id).await?;
    tracing::info!(tenant_id = %tenant_id, "Tenant unblocked by admin");
    db::audit::record(&state.pool, &tenant_id, "admin_unblocked", None, state.now()).await;
    Ok(success())
}

/// POST /admin/subscription
pub async fn create_charge(
    State(state): State<AppState>,
    Json(req): Json<CreateChargeRequest>,
) -> ApiResult<Subscription> {
    let price = match req.price {
        Some(p) => p,
        None => req.plan.price().to_f64().unwrap_or_default(),
    };
    let now = state.now();
    let sub = db::subscriptions::create_charge(
        &state.pool,
        &req.tenant_id,
        req.plan,
        price,
        req.due_date,
        now,
    )
    .await?;

    tracing::info!(
        tenant_id = %sub.tenant_id,
        subscription_id = %sub.id,
        due_date = sub.due_date,
        "Charge created"
    );
    db::audit::record(
        &state.pool,
        &sub.tenant_id,
        "charge_created",
        Some(serde_json::json!({ "subscriptionId": sub.id, "price": sub.price, "dueDate": sub.due_date })),
        now,
    )
    .await;

    Ok(Json(sub))
}

/// PUT /admin/subscription/{id}: only `pending -> paid` is accepted
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
    Json(req): Json<UpdateSubscriptionRequest>,
) -> ApiResult<Subscription> {
    if req.status != SubscriptionStatus::Paid {
        return Err(AppError::with_message(
            ErrorCode::InvalidSubscriptionTransition,
            "Only status \"paid\" can be set",
        ));
    }

    let now = state.now();
    let sub = db::subscriptions::mark_paid(
        &state.pool,
        &subscription_id,
        req.payment_method.as_deref(),
        now,
    )
    .await?;

    tracing::info!(
        tenant_id = %sub.tenant_id,
        subscription_id = %sub.id,
        "Charge marked paid"
    );
    db::audit::record(
        &state.pool,
        &sub.tenant_id,
        "charge_paid",
        Some(serde_json::json!({ "subscriptionId": sub.id, "paymentMethod": sub.payment_method })),
        now,
    )
    .await;

    Ok(Json(sub))
}

/// GET /admin/check-expirations
pub async fn check_expirations(State(state): State<AppState>) -> ApiResult<SweepReport> {
    let report = lifecycle::sweep::run(&state.pool, state.now()).await?;
    Ok(Json(report))
}

/// POST /admin/impersonate/{id}: a session for the tenant without its password
pub async fn impersonate(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let tenant = db::tenants::get(&state.pool, &tenant_id).await?;
    let token = create_token(&tenant.id, Role::Tenant, true, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(tenant_id = %tenant.id, "Super-admin impersonating tenant");
    db::audit::record(&state.pool, &tenant.id, "impersonated", None, state.now()).await;

    Ok(Json(SessionResponse {
        tenant: Some(tenant.session(true)),
        token,
        is_super_admin: false,
    }))
}

/// GET /admin/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<AdminStats> {
    let stats = db::stats::compute(&state.pool).await?;
    Ok(Json(stats))
}
