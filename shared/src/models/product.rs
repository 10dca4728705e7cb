//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity, owned by one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Image URL or data URI
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    pub stock: i64,
}

impl Product {
    /// Remove `quantity` units from stock, never going below zero
    pub fn take_stock(&mut self, quantity: i64) {
        self.stock = (self.stock - quantity).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: "p1".into(),
            name: "Coxinha".into(),
            price: 6.5,
            image: String::new(),
            category: "Salgados".into(),
            stock,
        }
    }

    #[test]
    fn test_take_stock_clamps_at_zero() {
        let mut p = product(3);
        p.take_stock(2);
        assert_eq!(p.stock, 1);
        p.take_stock(5);
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id":"p1","name":"Suco","price":8.0,"stock":4}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.image, "");
        assert_eq!(p.category, "");
    }
}
