//! Tenant lifecycle enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant lifecycle status
///
/// Exactly one holds at any time. `trial -> blocked` and `active -> blocked`
/// happen through the expiration evaluator or an admin block; the way back
/// to `active` is always an explicit admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    /// Free evaluation window, bounded by `trialEndsAt`
    Trial,
    /// Paying tenant, bounded by its latest pending charge
    Active,
    /// No access until an admin unblocks
    Blocked,
}

impl TenantStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(Self::Trial),
            "active" => Some(Self::Active),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }

    /// Can this tenant obtain a session?
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Trial | Self::Active)
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}

/// Why a tenant is blocked. Present only while status is `blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    TrialExpired,
    SubscriptionExpired,
    AdminBlocked,
}

impl BlockReason {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "trial_expired" => Some(Self::TrialExpired),
            "subscription_expired" => Some(Self::SubscriptionExpired),
            "admin_blocked" => Some(Self::AdminBlocked),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::TrialExpired => "trial_expired",
            Self::SubscriptionExpired => "subscription_expired",
            Self::AdminBlocked => "admin_blocked",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}
