//! Full tenant snapshot exchanged by the sync protocol

use serde::{Deserialize, Serialize};

use super::{Product, Sale, Settings};

/// Everything a POS client holds for one tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSnapshot {
    pub settings: Settings,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
}

/// Push body: omitted parts are left untouched on the server,
/// supplied collections replace the stored ones wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<Vec<Sale>>,
}

impl From<TenantSnapshot> for SnapshotPatch {
    fn from(snapshot: TenantSnapshot) -> Self {
        Self {
            settings: Some(snapshot.settings),
            products: Some(snapshot.products),
            sales: Some(snapshot.sales),
        }
    }
}

impl SnapshotPatch {
    pub fn is_empty(&self) -> bool {
        self.settings.is_none() && self.products.is_none() && self.sales.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_accepts_partial_body() {
        let patch: SnapshotPatch = serde_json::from_str(r#"{"products":[]}"#).unwrap();
        assert_eq!(patch.products, Some(vec![]));
        assert!(patch.sales.is_none());
        assert!(patch.settings.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_full_snapshot_becomes_full_patch() {
        let patch = SnapshotPatch::from(TenantSnapshot::default());
        assert!(patch.settings.is_some());
        assert!(patch.products.is_some());
        assert!(patch.sales.is_some());
    }
}
