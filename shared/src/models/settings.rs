//! Shop settings

use serde::{Deserialize, Serialize};

/// Tenant-editable branding and payment settings
///
/// Every field is always present on the wire; optional ones are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub shop_name: String,
    #[serde(default)]
    pub shop_logo: Option<String>,
    #[serde(default)]
    pub pix_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_fields_serialize_as_null() {
        let settings = Settings {
            shop_name: "Padaria".into(),
            shop_logo: None,
            pix_key: None,
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["shopName"], "Padaria");
        assert!(json.get("shopLogo").is_some_and(|v| v.is_null()));
        assert!(json.get("pixKey").is_some_and(|v| v.is_null()));
    }
}
