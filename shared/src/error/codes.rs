//! Unified error codes for the loyalty admin
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / session errors
//! - 2xxx: Store and channel context errors
//! - 3xxx: Points and tier settings errors
//! - 4xxx: Ways-to-earn errors
//! - 5xxx: Ways-to-redeem errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they serialize as plain
/// numbers for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// No session token
    NotAuthenticated = 1001,
    /// Signed payload rejected by the backend
    SignedPayloadInvalid = 1002,
    /// Session has expired
    SessionExpired = 1003,
    /// Permission denied
    PermissionDenied = 1004,

    // ==================== 2xxx: Store / channel ====================
    /// No store is associated with the session
    StoreNotSelected = 2001,
    /// No sales channel is selected
    ChannelNotSelected = 2002,
    /// Selected channel is not in the channel list
    ChannelNotFound = 2003,

    // ==================== 3xxx: Points ====================
    /// Point name is missing or malformed
    PointNameInvalid = 3001,
    /// No logo selected, uploaded, or persisted
    LogoRequired = 3002,
    /// Tier row failed validation
    TierInvalid = 3003,
    /// Point expiry days out of range
    PointExpiryInvalid = 3004,

    // ==================== 4xxx: Ways to earn ====================
    /// An enabled earn rule has no point value
    EarnRuleIncomplete = 4001,
    /// Event form failed validation
    EventInvalid = 4002,
    /// Event date lies in the past
    EventDateInPast = 4003,
    /// Rejoin settings failed validation
    RejoinInvalid = 4004,

    // ==================== 5xxx: Ways to redeem ====================
    /// Coupon form failed validation
    CouponInvalid = 5001,
    /// Some deletions of a bulk delete failed
    BulkDeletePartial = 5003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network request failed
    NetworkError = 9002,
    /// Local storage failed
    StorageError = 9003,
    /// Configuration error
    ConfigError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "Something went wrong. Please try again.",
            ErrorCode::ValidationFailed => "Please fix the errors in the form",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Not signed in",
            ErrorCode::SignedPayloadInvalid => "JWT verification failed",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::PermissionDenied => "Permission denied",

            // Store / channel
            ErrorCode::StoreNotSelected => "Store ID is missing",
            ErrorCode::ChannelNotSelected => "Store ID or Channel ID is missing",
            ErrorCode::ChannelNotFound => "Channel not found",

            // Points
            ErrorCode::PointNameInvalid => "Point name is invalid",
            ErrorCode::LogoRequired => "Please select or upload a logo",
            ErrorCode::TierInvalid => "Tier settings are invalid",
            ErrorCode::PointExpiryInvalid => "Expiry days must be between 1 and 365",

            // Ways to earn
            ErrorCode::EarnRuleIncomplete => "Enabled rules need a point value",
            ErrorCode::EventInvalid => {
                "Please fill in all fields: Event Name, Date of Event, and Points"
            }
            ErrorCode::EventDateInPast => {
                "Event date cannot be in the past. Please select today or a future date."
            }
            ErrorCode::RejoinInvalid => "Rejoin settings are invalid",

            // Ways to redeem
            ErrorCode::CouponInvalid => "Please fix the errors in the form",
            ErrorCode::BulkDeletePartial => "Some coupons could not be deleted",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network request failed",
            ErrorCode::StorageError => "Local storage error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl ErrorCode {
    /// Code for a failed form field, keyed the way the validators key them
    pub fn for_field(field: &str) -> Self {
        match field.split('.').next().unwrap_or(field) {
            "pointName" => ErrorCode::PointNameInvalid,
            "logo" => ErrorCode::LogoRequired,
            "tier" => ErrorCode::TierInvalid,
            "expiriesInDays" => ErrorCode::PointExpiryInvalid,
            "earnRules" => ErrorCode::EarnRuleIncomplete,
            "event" | "name" | "points" => ErrorCode::EventInvalid,
            "date" => ErrorCode::EventDateInPast,
            "dayOfRecall" | "pointRejoin" => ErrorCode::RejoinInvalid,
            "pointValue" | "discountAmount" | "expireCoupon" | "maxPoints" | "minimumPurchase"
            | "products" | "restriction" => ErrorCode::CouponInvalid,
            _ => ErrorCode::ValidationFailed,
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
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::SignedPayloadInvalid),
            1003 => Ok(ErrorCode::SessionExpired),
            1004 => Ok(ErrorCode::PermissionDenied),

            // Store / channel
            2001 => Ok(ErrorCode::StoreNotSelected),
            2002 => Ok(ErrorCode::ChannelNotSelected),
            2003 => Ok(ErrorCode::ChannelNotFound),

            // Points
            3001 => Ok(ErrorCode::PointNameInvalid),
            3002 => Ok(ErrorCode::LogoRequired),
            3003 => Ok(ErrorCode::TierInvalid),
            3004 => Ok(ErrorCode::PointExpiryInvalid),

            // Ways to earn
            4001 => Ok(ErrorCode::EarnRuleIncomplete),
            4002 => Ok(ErrorCode::EventInvalid),
            4003 => Ok(ErrorCode::EventDateInPast),
            4004 => Ok(ErrorCode::RejoinInvalid),

            // Ways to redeem
            5001 => Ok(ErrorCode::CouponInvalid),
            5003 => Ok(ErrorCode::BulkDeletePartial),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::NetworkError),
            9003 => Ok(ErrorCode::StorageError),
            9004 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
