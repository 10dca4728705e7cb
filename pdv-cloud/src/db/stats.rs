//! Cross-tenant figures for the admin dashboard

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::Plan;
use shared::admin::AdminStats;
use sqlx::SqlitePool;

use crate::error::ServiceResult;

pub async fn compute(pool: &SqlitePool) -> ServiceResult<AdminStats> {
    let by_status: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM tenants GROUP BY status")
            .fetch_all(pool)
            .await?;
    let by_plan: Vec<(String, i64)> =
        sqlx::query_as("SELECT plan, COUNT(*) FROM tenants GROUP BY plan")
            .fetch_all(pool)
            .await?;
    let active_by_plan: Vec<(String, i64)> =
        sqlx::query_as("SELECT plan, COUNT(*) FROM tenants WHERE status = 'active' GROUP BY plan")
            .fetch_all(pool)
            .await?;
    let sale_totals: Vec<(f64,)> = sqlx::query_as("SELECT total FROM sales")
        .fetch_all(pool)
        .await?;

    let count = |status: &str| {
        by_status
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    let revenue: Decimal = sale_totals
        .iter()
        .map(|(total,)| Decimal::try_from(*total).unwrap_or_default())
        .sum();

    let mrr: Decimal = active_by_plan
        .iter()
        .filter_map(|(plan, n)| Plan::from_db(plan).map(|p| p.price() * Decimal::from(*n)))
        .sum();

    Ok(AdminStats {
        total_tenants: by_status.iter().map(|(_, n)| n).sum(),
        active_tenants: count("active"),
        trial_tenants: count("trial"),
        blocked_tenants: count("blocked"),
        plan_counts: by_plan.into_iter().collect::<HashMap<_, _>>(),
        total_sales: sale_totals.len() as i64,
        total_revenue: revenue.round_dp(2).to_f64().unwrap_or_default(),
        mrr: mrr.to_f64().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{snapshot, tenants, test_pool};
    use shared::admin::TenantUpdate;
    use shared::{PaymentMethod, Sale, SnapshotPatch, TenantStatus};

    async fn tenant(pool: &SqlitePool, key: &str, plan: Plan, status: TenantStatus) -> String {
        let t = tenants::create(
            pool,
            &tenants::NewTenant {
                login_key: key,
                shop_name: key,
                hashed_password: "hash",
                trial_ends_at: 0,
                now: 0,
            },
        )
        .await
        .unwrap();
        let patch = TenantUpdate {
            plan: Some(plan),
            status: Some(status),
            ..Default::default()
        };
        tenants::update(pool, &t.id, &patch).await.unwrap();
        t.id
    }

    fn sale(id: &str, total: f64) -> Sale {
        Sale {
            id: id.into(),
            items: vec![],
            total,
            payment_method: PaymentMethod::Money,
            timestamp: 0,
            buyer_name: None,
            buyer_phone: None,
        }
    }

    #[tokio::test]
    async fn test_stats_on_empty_db() {
        let pool = test_pool().await;
        let stats = compute(&pool).await.unwrap();
        assert_eq!(stats, AdminStats::default());
    }

    #[tokio::test]
    async fn test_counts_revenue_and_mrr() {
        let pool = test_pool().await;
        let a = tenant(&pool, "1", Plan::Pro, TenantStatus::Active).await;
        tenant(&pool, "2", Plan::Business, TenantStatus::Active).await;
        tenant(&pool, "3", Plan::Partner, TenantStatus::Active).await;
        tenant(&pool, "4", Plan::Starter, TenantStatus::Trial).await;
        tenant(&pool, "5", Plan::Pro, TenantStatus::Blocked).await;

        let patch = SnapshotPatch {
            sales: Some(vec![sale("s1", 0.1), sale("s2", 0.2)]),
            ..Default::default()
        };
        snapshot::apply(&pool, &a, &patch).await.unwrap();

        let stats = compute(&pool).await.unwrap();
        assert_eq!(stats.total_tenants, 5);
        assert_eq!(stats.active_tenants, 3);
        assert_eq!(stats.trial_tenants, 1);
        assert_eq!(stats.blocked_tenants, 1);
        assert_eq!(stats.plan_counts.get("pro"), Some(&2));
        assert_eq!(stats.total_sales, 2);
        assert_eq!(stats.total_revenue, 0.3);
        // pro 59 + business 99 + partner 0; trial and blocked excluded
        assert_eq!(stats.mrr, 158.0);
    }
}
