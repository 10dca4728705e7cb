//! Subscription plan catalog

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plan identifier
///
/// `Partner` is a zero-price plan handed out by the super-admin and never
/// listed publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Starter,
    Pro,
    Business,
    Partner,
}

impl Plan {
    /// Every plan, hidden ones included
    pub const ALL: [Plan; 4] = [Plan::Starter, Plan::Pro, Plan::Business, Plan::Partner];

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "starter" => Some(Self::Starter),
            "pro" => Some(Self::Pro),
            "business" => Some(Self::Business),
            "partner" => Some(Self::Partner),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Business => "business",
            Self::Partner => "partner",
        }
    }

    /// Monthly list price
    pub fn price(&self) -> Decimal {
        match self {
            Self::Starter => Decimal::from(29),
            Self::Pro => Decimal::from(59),
            Self::Business => Decimal::from(99),
            Self::Partner => Decimal::ZERO,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Starter => "Iniciante",
            Self::Pro => "Profissional",
            Self::Business => "Empresarial",
            Self::Partner => "Parceiro",
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Partner)
    }

    /// Plans shown on the public pricing page
    pub fn public() -> impl Iterator<Item = Plan> {
        Self::ALL.into_iter().filter(|p| !p.is_hidden())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_prices() {
        assert_eq!(Plan::Starter.price(), Decimal::from(29));
        assert_eq!(Plan::Pro.price(), Decimal::from(59));
        assert_eq!(Plan::Business.price(), Decimal::from(99));
        assert!(Plan::Partner.price().is_zero());
    }

    #[test]
    fn test_partner_is_hidden() {
        let public: Vec<_> = Plan::public().collect();
        assert_eq!(public, vec![Plan::Starter, Plan::Pro, Plan::Business]);
    }

    #[test]
    fn test_unknown_plan_rejected() {
        assert_eq!(Plan::from_db("enterprise"), None);
        assert!(serde_json::from_str::<Plan>("\"enterprise\"").is_err());
        assert_eq!(serde_json::from_str::<Plan>("\"pro\"").unwrap(), Plan::Pro);
    }
}
