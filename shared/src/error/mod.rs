//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Store / channel errors
//! - 3xxx: Points settings errors
//! - 4xxx: Ways-to-earn errors
//! - 5xxx: Ways-to-redeem errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::LogoRequired);
//! assert_eq!(err.toast_message(), "Please select or upload a logo");
//!
//! let err = AppError::validation("Points must be between 1-10000")
//!     .with_detail("field", "points");
//! assert!(err.details.is_some());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
