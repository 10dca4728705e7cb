//! Sale Model

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash
    Money,
    Pix,
    Card,
}

/// One line of a sale, with the product price captured at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Completed sale. Ids are generated on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub items: Vec<SaleItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    /// Unix millis
    pub timestamp: i64,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
}

impl Sale {
    /// Sum of price x quantity, rounded to cents
    pub fn total_of(items: &[SaleItem]) -> f64 {
        items
            .iter()
            .map(|item| {
                Decimal::try_from(item.price).unwrap_or_default() * Decimal::from(item.quantity)
            })
            .sum::<Decimal>()
            .round_dp(2)
            .to_f64()
            .unwrap_or_default()
    }
}
