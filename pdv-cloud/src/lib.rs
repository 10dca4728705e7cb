//! pdv-cloud: multi-tenant POS backend
//!
//! Tenant lifecycle (trial, active, blocked), billing charges, login gate
//! and full-replace snapshot sync for local-first POS clients.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod state;
pub mod util;

pub use config::Config;
pub use error::{BoxError, ServiceError, ServiceResult};
pub use state::AppState;
