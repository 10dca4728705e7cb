//! Expiration evaluator: pure decision over (tenant, latest pending charge, now)

use shared::{BlockReason, Subscription, TenantStatus};

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NoOp,
    Block(BlockReason),
}

/// Minimal view of a tenant the rules need
#[derive(Debug, Clone, Copy)]
pub struct TenantView {
    pub status: TenantStatus,
    pub trial_ends_at: i64,
}

/// Rules, first match wins:
/// 1. trial and `now > trial_ends_at` blocks with `trial_expired`
/// 2. active with a pending charge and `now > due_date` blocks with `subscription_expired`
/// 3. otherwise no-op
///
/// Already-blocked tenants always evaluate to no-op.
pub fn evaluate(tenant: TenantView, latest_pending: Option<&Subscription>, now: i64) -> Verdict {
    match tenant.status {
        TenantStatus::Trial if now > tenant.trial_ends_at => {
            Verdict::Block(BlockReason::TrialExpired)
        }
        TenantStatus::Active => match latest_pending {
            Some(sub) if sub.is_pending() && now > sub.due_date => {
                Verdict::Block(BlockReason::SubscriptionExpired)
            }
            _ => Verdict::NoOp,
        },
        _ => Verdict::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Plan, SubscriptionStatus};

    fn view(status: TenantStatus, trial_ends_at: i64) -> TenantView {
        TenantView {
            status,
            trial_ends_at,
        }
    }

    fn pending(due_date: i64) -> Subscription {
        Subscription {
            id: "s".into(),
            tenant_id: "t".into(),
            plan: Plan::Pro,
            price: 59.0,
            status: SubscriptionStatus::Pending,
            due_date,
            paid_at: None,
            payment_method: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_trial_blocks_strictly_after_end() {
        let t = view(TenantStatus::Trial, 1_000);
        assert_eq!(evaluate(t, None, 999), Verdict::NoOp);
        assert_eq!(evaluate(t, None, 1_000), Verdict::NoOp);
        assert_eq!(
            evaluate(t, None, 1_001),
            Verdict::Block(BlockReason::TrialExpired)
        );
    }

    #[test]
    fn test_trial_ignores_pending_charges() {
        let t = view(TenantStatus::Trial, 10_000);
        assert_eq!(evaluate(t, Some(&pending(0)), 5_000), Verdict::NoOp);
    }

    #[test]
    fn test_active_blocks_on_overdue_charge() {
        let t = view(TenantStatus::Active, 0);
        assert_eq!(evaluate(t, Some(&pending(2_000)), 2_000), Verdict::NoOp);
        assert_eq!(
            evaluate(t, Some(&pending(2_000)), 2_001),
            Verdict::Block(BlockReason::SubscriptionExpired)
        );
    }

    #[test]
    fn test_active_ignores_trial_end() {
        // trial_ends_at is only consulted while in trial
        let t = view(TenantStatus::Active, 0);
        assert_eq!(evaluate(t, None, i64::MAX), Verdict::NoOp);
    }

    #[test]
    fn test_paid_charge_never_blocks() {
        let t = view(TenantStatus::Active, 0);
        let mut sub = pending(0);
        sub.status = SubscriptionStatus::Paid;
        assert_eq!(evaluate(t, Some(&sub), 1_000_000), Verdict::NoOp);
    }

    #[test]
    fn test_blocked_is_noop() {
        let t = view(TenantStatus::Blocked, 0);
        assert_eq!(evaluate(t, Some(&pending(0)), 1_000_000), Verdict::NoOp);
    }
}
