//! Batch expiration sweep over every unblocked tenant

use shared::TenantStatus;
use shared::admin::{ExpiringTenant, SweepReport};
use shared::util::{MILLIS_PER_DAY, MILLIS_PER_HOUR};
use sqlx::SqlitePool;

use super::{Checked, Verdict, check_tenant};
use crate::db;
use crate::error::ServiceResult;

/// Trials ending within this window are reported as expiring soon
pub const TRIAL_WARNING_WINDOW: i64 = 24 * MILLIS_PER_HOUR;
/// Pending charges due within this window are reported as expiring soon
pub const SUBSCRIPTION_WARNING_WINDOW: i64 = 3 * MILLIS_PER_DAY;

/// Block every tenant whose trial or latest pending charge has lapsed, and
/// collect the advisory "expiring soon" lists (read-only).
pub async fn run(pool: &SqlitePool, now: i64) -> ServiceResult<SweepReport> {
    let mut report = SweepReport::default();

    for tenant in db::tenants::list_unblocked(pool).await? {
        let Checked { tenant, verdict } = check_tenant(pool, tenant, now).await?;
        match verdict {
            Verdict::Block(_) if tenant.status == TenantStatus::Trial => {
                report.blocked += 1;
                report.trials_expired.push(ExpiringTenant {
                    tenant_id: tenant.id.clone(),
                    shop_name: tenant.shop_name.clone(),
                    expires_at: tenant.trial_ends_at,
                });
            }
            Verdict::Block(_) => {
                report.blocked += 1;
                let due = db::subscriptions::latest_pending(pool, &tenant.id)
                    .await?
                    .map(|s| s.due_date)
                    .unwrap_or(now);
                report.subscriptions_expired.push(ExpiringTenant {
                    tenant_id: tenant.id.clone(),
                    shop_name: tenant.shop_name.clone(),
                    expires_at: due,
                });
            }
            Verdict::NoOp => match tenant.status {
                TenantStatus::Trial if tenant.trial_ends_at - now <= TRIAL_WARNING_WINDOW => {
                    report.trials_expiring_soon.push(ExpiringTenant {
                        tenant_id: tenant.id.clone(),
                        shop_name: tenant.shop_name.clone(),
                        expires_at: tenant.trial_ends_at,
                    });
                }
                TenantStatus::Active => {
                    if let Some(sub) = db::subscriptions::latest_pending(pool, &tenant.id).await?
                        && sub.due_date - now <= SUBSCRIPTION_WARNING_WINDOW
                    {
                        report.subscriptions_expiring_soon.push(ExpiringTenant {
                            tenant_id: tenant.id.clone(),
                            shop_name: tenant.shop_name.clone(),
                            expires_at: sub.due_date,
                        });
                    }
                }
                _ => {}
            },
        }
    }

    tracing::info!(
        blocked = report.blocked,
        trials_expiring_soon = report.trials_expiring_soon.len(),
        subscriptions_expiring_soon = report.subscriptions_expiring_soon.len(),
        "Expiration sweep finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{subscriptions, tenants, test_pool};
    use rand::Rng;
    use shared::admin::TenantUpdate;
    use shared::{BlockReason, Plan, SubscriptionStatus};

    async fn tenant(pool: &SqlitePool, key: &str, status: TenantStatus, trial_ends_at: i64) -> String {
        let t = tenants::create(
            pool,
            &tenants::NewTenant {
                login_key: key,
                shop_name: key,
                hashed_password: "hash",
                trial_ends_at,
                now: 0,
            },
        )
        .await
        .unwrap();
        if status != TenantStatus::Trial {
            let patch = TenantUpdate {
                status: Some(status),
                ..Default::default()
            };
            tenants::update(pool, &t.id, &patch).await.unwrap();
        }
        t.id
    }

    #[tokio::test]
    async fn test_sweep_blocks_and_reports() {
        let pool = test_pool().await;
        let now = 100 * MILLIS_PER_DAY;

        let expired_trial = tenant(&pool, "1", TenantStatus::Trial, now - 1).await;
        let soon_trial = tenant(&pool, "2", TenantStatus::Trial, now + MILLIS_PER_HOUR).await;
        tenant(&pool, "3", TenantStatus::Trial, now + 5 * MILLIS_PER_DAY).await;

        let overdue = tenant(&pool, "4", TenantStatus::Active, 0).await;
        subscriptions::create_charge(&pool, &overdue, Plan::Pro, 59.0, now - 1, 0)
            .await
            .unwrap();
        let due_soon = tenant(&pool, "5", TenantStatus::Active, 0).await;
        subscriptions::create_charge(&pool, &due_soon, Plan::Pro, 59.0, now + MILLIS_PER_DAY, 0)
            .await
            .unwrap();
        let already_blocked = tenant(&pool, "6", TenantStatus::Blocked, 0).await;

        let report = run(&pool, now).await.unwrap();

        assert_eq!(report.blocked, 2);
        assert_eq!(report.trials_expired.len(), 1);
        assert_eq!(report.trials_expired[0].tenant_id, expired_trial);
        assert_eq!(report.trials_expiring_soon.len(), 1);
        assert_eq!(report.trials_expiring_soon[0].tenant_id, soon_trial);
        assert_eq!(report.subscriptions_expired.len(), 1);
        assert_eq!(report.subscriptions_expired[0].tenant_id, overdue);
        assert_eq!(report.subscriptions_expired[0].expires_at, now - 1);
        assert_eq!(report.subscriptions_expiring_soon.len(), 1);
        assert_eq!(report.subscriptions_expiring_soon[0].tenant_id, due_soon);

        let overdue_row = tenants::get(&pool, &overdue).await.unwrap();
        assert_eq!(
            overdue_row.blocked_reason,
            Some(BlockReason::SubscriptionExpired)
        );
        // Advisory entries are not mutated
        let soon_row = tenants::get(&pool, &soon_trial).await.unwrap();
        assert_eq!(soon_row.status, TenantStatus::Trial);
        let blocked_row = tenants::get(&pool, &already_blocked).await.unwrap();
        assert_eq!(blocked_row.blocked_reason, Some(BlockReason::AdminBlocked));
    }

    #[tokio::test]
    async fn test_second_sweep_is_quiet() {
        let pool = test_pool().await;
        tenant(&pool, "1", TenantStatus::Trial, 10).await;

        assert_eq!(run(&pool, 11).await.unwrap().blocked, 1);
        assert_eq!(run(&pool, 12).await.unwrap(), SweepReport::default());
    }

    #[tokio::test]
    async fn test_sweeps_never_mark_charges_paid() {
        let pool = test_pool().await;
        let mut rng = rand::thread_rng();
        let mut charge_ids = Vec::new();

        for i in 0..12 {
            let status = if rng.gen_bool(0.5) {
                TenantStatus::Trial
            } else {
                TenantStatus::Active
            };
            let id = tenant(&pool, &format!("55{i}"), status, rng.gen_range(0..10_000)).await;
            for _ in 0..rng.gen_range(0..4) {
                let sub = subscriptions::create_charge(
                    &pool,
                    &id,
                    Plan::Starter,
                    29.0,
                    rng.gen_range(0..10_000),
                    0,
                )
                .await
                .unwrap();
                charge_ids.push(sub.id);
            }
        }

        for _ in 0..5 {
            run(&pool, rng.gen_range(0..12_000)).await.unwrap();
        }

        for id in charge_ids {
            let sub = subscriptions::find_by_id(&pool, &id).await.unwrap().unwrap();
            assert_eq!(sub.status, SubscriptionStatus::Pending);
            assert!(sub.paid_at.is_none());
        }
    }
}
