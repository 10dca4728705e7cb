//! Subscription Ledger

use shared::error::{AppError, ErrorCode};
use shared::{Plan, Subscription, SubscriptionStatus};
use sqlx::SqlitePool;

use crate::error::{ServiceError, ServiceResult};

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    tenant_id: String,
    plan: String,
    price: f64,
    status: String,
    due_date: i64,
    paid_at: Option<i64>,
    payment_method: Option<String>,
    created_at: i64,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = ServiceError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let plan = Plan::from_db(&row.plan)
            .ok_or_else(|| ServiceError::Db(format!("unknown plan in db: {}", row.plan).into()))?;
        let status = SubscriptionStatus::from_db(&row.status).ok_or_else(|| {
            ServiceError::Db(format!("unknown subscription status in db: {}", row.status).into())
        })?;
        Ok(Subscription {
            id: row.id,
            tenant_id: row.tenant_id,
            plan,
            price: row.price,
            status,
            due_date: row.due_date,
            paid_at: row.paid_at,
            payment_method: row.payment_method,
            created_at: row.created_at,
        })
    }
}

/// Append a pending charge. Never deduplicated against existing ones.
pub async fn create_charge(
    pool: &SqlitePool,
    tenant_id: &str,
    plan: Plan,
    price: f64,
    due_date: i64,
    now: i64,
) -> ServiceResult<Subscription> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("price must be a non-negative number").into());
    }

    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM tenants WHERE id = ?")
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::new(ErrorCode::TenantNotFound).into());
    }

    let subscription = Subscription {
        id: uuid::Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        plan,
        price,
        status: SubscriptionStatus::Pending,
        due_date,
        paid_at: None,
        payment_method: None,
        created_at: now,
    };

    sqlx::query(
        "INSERT INTO subscriptions (id, tenant_id, plan, price, status, due_date, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&subscription.id)
    .bind(&subscription.tenant_id)
    .bind(plan.as_db())
    .bind(price)
    .bind(SubscriptionStatus::Pending.as_db())
    .bind(due_date)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(subscription)
}

/// Mark a charge paid. A second call overwrites `paid_at` / `payment_method`.
///
/// Does not touch the tenant's status.
pub async fn mark_paid(
    pool: &SqlitePool,
    subscription_id: &str,
    payment_method: Option<&str>,
    now: i64,
) -> ServiceResult<Subscription> {
    let result = sqlx::query(
        "UPDATE subscriptions SET status = 'paid', paid_at = ?, payment_method = ? WHERE id = ?",
    )
    .bind(now)
    .bind(payment_method)
    .bind(subscription_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::SubscriptionNotFound).into());
    }

    find_by_id(pool, subscription_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SubscriptionNotFound).into())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> ServiceResult<Option<Subscription>> {
    let row: Option<SubscriptionRow> = sqlx::query_as("SELECT * FROM subscriptions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Subscription::try_from).transpose()
}

/// The pending charge with the greatest due date, if any
pub async fn latest_pending(
    pool: &SqlitePool,
    tenant_id: &str,
) -> ServiceResult<Option<Subscription>> {
    let row: Option<SubscriptionRow> = sqlx::query_as(
        "SELECT * FROM subscriptions
         WHERE tenant_id = ? AND status = 'pending'
         ORDER BY due_date DESC, created_at DESC
         LIMIT 1",
    )
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;
    row.map(Subscription::try_from).transpose()
}

/// Full billing history, newest due date first
pub async fn list_for_tenant(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<Vec<Subscription>> {
    let rows: Vec<SubscriptionRow> = sqlx::query_as(
        "SELECT * FROM subscriptions WHERE tenant_id = ? ORDER BY due_date DESC, created_at DESC",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Subscription::try_from).collect()
}
