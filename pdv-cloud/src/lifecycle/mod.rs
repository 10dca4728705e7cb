//! Tenant lifecycle: expiration evaluation and the automatic blocking path
//!
//! [`check_tenant`] is the only place that blocks a tenant without an admin
//! asking for it. Login and the batch sweep both go through it.

pub mod evaluator;
pub mod sweep;

pub use evaluator::{TenantView, Verdict, evaluate};

use shared::{BlockReason, TenantStatus};
use sqlx::SqlitePool;

use crate::db::{self, tenants::Tenant};
use crate::error::ServiceResult;

impl From<&Tenant> for TenantView {
    fn from(tenant: &Tenant) -> Self {
        TenantView {
            status: tenant.status,
            trial_ends_at: tenant.trial_ends_at,
        }
    }
}

/// Result of [`check_tenant`]
#[derive(Debug)]
pub struct Checked {
    /// Row the verdict was reached on; re-read if the stored row had moved on
    pub tenant: Tenant,
    /// `Block` only when this call wrote the block
    pub verdict: Verdict,
}

/// Evaluate one tenant against its latest pending charge and persist a block
/// when the verdict calls for one.
///
/// The block is written only if the stored status still matches the status
/// that was evaluated. Otherwise the current row is read back and judged
/// again.
pub async fn check_tenant(pool: &SqlitePool, mut tenant: Tenant, now: i64) -> ServiceResult<Checked> {
    loop {
        let latest_pending = if tenant.status == TenantStatus::Active {
            db::subscriptions::latest_pending(pool, &tenant.id).await?
        } else {
            None
        };

        let verdict = evaluate((&tenant).into(), latest_pending.as_ref(), now);
        let Verdict::Block(reason) = verdict else {
            return Ok(Checked { tenant, verdict });
        };

        if db::tenants::block_if_status(pool, &tenant.id, tenant.status, reason).await? {
            record_block(pool, &tenant.id, reason, now).await;
            return Ok(Checked { tenant, verdict });
        }

        tracing::debug!(tenant_id = %tenant.id, "Tenant changed during expiration check, re-evaluating");
        tenant = db::tenants::get(pool, &tenant.id).await?;
    }
}

async fn record_block(pool: &SqlitePool, tenant_id: &str, reason: BlockReason, now: i64) {
    tracing::info!(tenant_id, %reason, "Tenant blocked by expiration check");
    db::audit::record(
        pool,
        tenant_id,
        "auto_blocked",
        Some(serde_json::json!({ "reason": reason.as_db() })),
        now,
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{subscriptions, tenants, test_pool};
    use shared::Plan;
    use shared::admin::TenantUpdate;

    async fn trial_tenant(pool: &SqlitePool, trial_ends_at: i64) -> Tenant {
        tenants::create(
            pool,
            &tenants::NewTenant {
                login_key: "11900000000",
                shop_name: "Loja",
                hashed_password: "hash",
                trial_ends_at,
                now: 0,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_expired_trial_is_persisted_as_blocked() {
        let pool = test_pool().await;
        let tenant = trial_tenant(&pool, 100).await;

        let checked = check_tenant(&pool, tenant.clone(), 101).await.unwrap();
        assert_eq!(checked.verdict, Verdict::Block(BlockReason::TrialExpired));

        let stored = tenants::get(&pool, &tenant.id).await.unwrap();
        assert_eq!(stored.status, TenantStatus::Blocked);
        assert_eq!(stored.blocked_reason, Some(BlockReason::TrialExpired));
    }

    #[tokio::test]
    async fn test_active_tenant_consults_latest_pending_only() {
        let pool = test_pool().await;
        let tenant = trial_tenant(&pool, 0).await;
        let patch = TenantUpdate {
            status: Some(TenantStatus::Active),
            ..Default::default()
        };
        tenants::update(&pool, &tenant.id, &patch).await.unwrap();
        let tenant = tenants::get(&pool, &tenant.id).await.unwrap();

        // Overdue older charge is shadowed by a later one still in the future
        subscriptions::create_charge(&pool, &tenant.id, Plan::Pro, 59.0, 1_000, 0)
            .await
            .unwrap();
        subscriptions::create_charge(&pool, &tenant.id, Plan::Pro, 59.0, 5_000, 0)
            .await
            .unwrap();

        let early = check_tenant(&pool, tenant.clone(), 2_000).await.unwrap();
        assert_eq!(early.verdict, Verdict::NoOp);
        let late = check_tenant(&pool, tenant, 5_001).await.unwrap();
        assert_eq!(late.verdict, Verdict::Block(BlockReason::SubscriptionExpired));
    }

    #[tokio::test]
    async fn test_stale_trial_row_does_not_block_activated_tenant() {
        let pool = test_pool().await;
        let stale = trial_tenant(&pool, 100).await;

        let activate = TenantUpdate {
            status: Some(TenantStatus::Active),
            ..Default::default()
        };
        tenants::update(&pool, &stale.id, &activate).await.unwrap();

        let checked = check_tenant(&pool, stale.clone(), 200).await.unwrap();
        assert_eq!(checked.verdict, Verdict::NoOp);
        assert_eq!(checked.tenant.status, TenantStatus::Active);

        let stored = tenants::get(&pool, &stale.id).await.unwrap();
        assert_eq!(stored.status, TenantStatus::Active);
        assert!(stored.blocked_reason.is_none());
    }

    #[tokio::test]
    async fn test_stale_row_keeps_admin_block_reason() {
        let pool = test_pool().await;
        let stale = trial_tenant(&pool, 100).await;
        tenants::set_blocked(&pool, &stale.id, BlockReason::AdminBlocked)
            .await
            .unwrap();

        let checked = check_tenant(&pool, stale.clone(), 200).await.unwrap();
        assert_eq!(checked.verdict, Verdict::NoOp);
        assert_eq!(checked.tenant.status, TenantStatus::Blocked);

        let stored = tenants::get(&pool, &stale.id).await.unwrap();
        assert_eq!(stored.blocked_reason, Some(BlockReason::AdminBlocked));
    }

    #[tokio::test]
    async fn test_stale_active_row_still_blocks_on_overdue_charge() {
        let pool = test_pool().await;
        let stale = trial_tenant(&pool, 100).await;

        let activate = TenantUpdate {
            status: Some(TenantStatus::Active),
            ..Default::default()
        };
        tenants::update(&pool, &stale.id, &activate).await.unwrap();
        subscriptions::create_charge(&pool, &stale.id, Plan::Pro, 59.0, 150, 0)
            .await
            .unwrap();

        let checked = check_tenant(&pool, stale.clone(), 200).await.unwrap();
        assert_eq!(
            checked.verdict,
            Verdict::Block(BlockReason::SubscriptionExpired)
        );
        let stored = tenants::get(&pool, &stale.id).await.unwrap();
        assert_eq!(stored.blocked_reason, Some(BlockReason::SubscriptionExpired));
    }
}
