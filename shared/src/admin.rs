//! Super-admin request/response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{BlockReason, Plan, SubscriptionStatus, TenantStatus};

/// PUT /admin/tenant/{id}. Only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TenantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<i64>,
}

/// POST /admin/subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeRequest {
    pub tenant_id: String,
    pub plan: Plan,
    /// Defaults to the plan's list price
    #[serde(default)]
    pub price: Option<f64>,
    pub due_date: i64,
}

/// PUT /admin/subscription/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Tenant row in the admin list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: String,
    pub login_key: String,
    pub shop_name: String,
    pub plan: Plan,
    pub status: TenantStatus,
    pub blocked_reason: Option<BlockReason>,
    pub trial_ends_at: i64,
    pub created_at: i64,
}

/// Reference to a tenant inside a sweep report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringTenant {
    pub tenant_id: String,
    pub shop_name: String,
    /// Trial end or subscription due date, Unix millis
    pub expires_at: i64,
}

/// Result of one expiration sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Tenants blocked in this run because their trial ended
    pub trials_expired: Vec<ExpiringTenant>,
    /// Trials ending within the next 24 hours (advisory)
    pub trials_expiring_soon: Vec<ExpiringTenant>,
    /// Tenants blocked in this run because a charge went unpaid
    pub subscriptions_expired: Vec<ExpiringTenant>,
    /// Pending charges due within the next 3 days (advisory)
    pub subscriptions_expiring_soon: Vec<ExpiringTenant>,
    /// Number of tenants blocked by this run
    pub blocked: usize,
}

/// GET /admin/stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_tenants: i64,
    pub active_tenants: i64,
    pub trial_tenants: i64,
    pub blocked_tenants: i64,
    pub plan_counts: HashMap<String, i64>,
    pub total_sales: i64,
    pub total_revenue: f64,
    /// Sum of list prices of active tenants' plans
    pub mrr: f64,
}
