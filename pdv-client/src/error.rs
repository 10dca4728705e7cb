//! Client error types

use shared::error::ErrorCode;
use shared::BlockReason;
use thiserror::Error;

use crate::cache::CacheError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server could not be reached
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// Request or startup fetch exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// Server answered with a structured error body
    #[error("Rejected ({status}): {message}")]
    Rejected {
        status: u16,
        code: ErrorCode,
        message: String,
        reason: Option<BlockReason>,
    },

    /// Local cache failure
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ClientError {
    /// Network, timeout or non-2xx outcome of a sync call
    pub fn is_sync_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Unreachable(_) | Self::Timeout | Self::Rejected { .. }
        )
    }

    /// Error code carried by a server rejection
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::Unreachable(_) => Some(ErrorCode::SyncUnreachable),
            Self::Timeout => Some(ErrorCode::TimeoutError),
            _ => None,
        }
    }

    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Unreachable(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
