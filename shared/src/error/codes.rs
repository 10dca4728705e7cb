//! Unified error codes for SmartPDV
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: Billing errors
//! - 5xxx: Sync errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare u16 so the POS frontend can switch on it without
/// knowing the Rust variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Auth ====================
    /// No bearer token supplied
    NotAuthenticated = 1001,
    /// Unknown login key or wrong password
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Tenant is blocked (trial expired, subscription expired or admin block)
    AccountBlocked = 1008,
    /// Password shorter than the minimum length
    PasswordTooShort = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Super-admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Tenant ====================
    /// Tenant not found
    TenantNotFound = 3002,
    /// Another tenant already uses this login key
    DuplicateLoginKey = 3101,

    // ==================== 4xxx: Billing ====================
    /// Subscription not found
    SubscriptionNotFound = 4001,
    /// Requested subscription status change is not allowed
    InvalidSubscriptionTransition = 4003,

    // ==================== 5xxx: Sync ====================
    /// Server unreachable or timed out during snapshot fetch/push
    SyncUnreachable = 5001,
    /// Pushed snapshot is internally inconsistent (e.g. duplicate ids)
    SnapshotInvalid = 5002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid login or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountBlocked => "Account is blocked",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Tenant
            ErrorCode::TenantNotFound => "Tenant not found",
            ErrorCode::DuplicateLoginKey => "Login key is already registered",

            // Billing
            ErrorCode::SubscriptionNotFound => "Subscription not found",
            ErrorCode::InvalidSubscriptionTransition => "Subscription status change not allowed",

            // Sync
            ErrorCode::SyncUnreachable => "Sync server unreachable",
            ErrorCode::SnapshotInvalid => "Snapshot is invalid",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::AccountBlocked),
            1009 => Ok(ErrorCode::PasswordTooShort),

            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            3002 => Ok(ErrorCode::TenantNotFound),
            3101 => Ok(ErrorCode::DuplicateLoginKey),

            4001 => Ok(ErrorCode::SubscriptionNotFound),
            4003 => Ok(ErrorCode::InvalidSubscriptionTransition),

            5001 => Ok(ErrorCode::SyncUnreachable),
            5002 => Ok(ErrorCode::SnapshotInvalid),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::AccountBlocked.code(), 1008);
        assert_eq!(ErrorCode::DuplicateLoginKey.code(), 3101);
        assert_eq!(ErrorCode::SubscriptionNotFound.code(), 4001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::AccountBlocked).unwrap();
        assert_eq!(json, "1008");

        let code: ErrorCode = serde_json::from_str("3101").unwrap();
        assert_eq!(code, ErrorCode::DuplicateLoginKey);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("0");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_every_variant_converts_back() {
        let codes = [
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::AccountBlocked,
            ErrorCode::PasswordTooShort,
            ErrorCode::PermissionDenied,
            ErrorCode::AdminRequired,
            ErrorCode::TenantNotFound,
            ErrorCode::DuplicateLoginKey,
            ErrorCode::SubscriptionNotFound,
            ErrorCode::InvalidSubscriptionTransition,
            ErrorCode::SyncUnreachable,
            ErrorCode::SnapshotInvalid,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::TimeoutError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(ErrorCode::AccountBlocked.message(), "Account is blocked");
        assert_eq!(
            format!("{}", InvalidErrorCode(999)),
            "invalid error code: 999"
        );
    }
}
