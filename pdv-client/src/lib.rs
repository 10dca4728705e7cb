//! pdv-client: local-first sync engine for POS clients
//!
//! Keeps a tenant's products, sales and settings in a local redb cache,
//! serves them offline and mirrors every change to pdv-cloud as a full
//! snapshot push.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod sync;

pub use cache::{CacheError, CacheKey, CacheResult, LocalCache, RedbCache};
pub use config::SyncConfig;
pub use error::{ClientError, ClientResult};
pub use http::CloudClient;
pub use sync::{NewSale, PushHandle, SnapshotRemote, StartupSource, SyncEngine};

// Re-export shared types for convenience
pub use shared::{
    PaymentMethod, Product, Sale, SaleItem, Settings, SnapshotPatch, TenantSnapshot,
};
