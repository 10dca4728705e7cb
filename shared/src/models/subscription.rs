//! Subscription (billing period) model

use serde::{Deserialize, Serialize};

use super::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    Paid,
}

impl SubscriptionStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

/// One invoiced billing period
///
/// `price` is a snapshot taken at creation; later plan price changes do not
/// touch existing rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub tenant_id: String,
    pub plan: Plan,
    pub price: f64,
    pub status: SubscriptionStatus,
    /// Unix millis
    pub due_date: i64,
    pub paid_at: Option<i64>,
    pub payment_method: Option<String>,
    pub created_at: i64,
}

impl Subscription {
    pub fn is_pending(&self) -> bool {
        self.status == SubscriptionStatus::Pending
    }
}
