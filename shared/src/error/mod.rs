//! Unified error system for SmartPDV
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: JSON shape of every failed response
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//! use shared::BlockReason;
//!
//! let err = AppError::account_blocked(BlockReason::SubscriptionExpired);
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, ErrorCode::AccountBlocked.code());
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
