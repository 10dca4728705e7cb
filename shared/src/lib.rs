//! Shared types for SmartPDV
//!
//! Wire models, the unified error system and small helpers used by both
//! the cloud server and the local-first client.

pub mod admin;
pub mod error;
pub mod models;
pub mod session;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use models::{
    BlockReason, PaymentMethod, Plan, Product, Sale, SaleItem, Settings, SnapshotPatch,
    Subscription, SubscriptionStatus, TenantSnapshot, TenantStatus,
};
