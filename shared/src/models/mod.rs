//! Data models
//!
//! Shared between the cloud server and POS clients (via API).
//! JSON field names are camelCase; enum values are snake_case.

pub mod plan;
pub mod product;
pub mod sale;
pub mod settings;
pub mod snapshot;
pub mod subscription;
pub mod tenant;

// Re-exports
pub use plan::*;
pub use product::*;
pub use sale::*;
pub use settings::*;
pub use snapshot::*;
pub use subscription::*;
pub use tenant::*;
