//! Application error type

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use crate::validation::FieldErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Every failure that reaches a view boundary is expressed as an `AppError`:
/// - locally detected validation failures (field errors in `details`)
/// - network / API failures (server message when one was returned)
/// - partial batch failures (failed ids in `details`)
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, failed ids, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Message suitable for a transient toast notification
    ///
    /// Falls back to the generic text for the code when the message is blank.
    pub fn toast_message(&self) -> &str {
        if self.message.trim().is_empty() {
            self.code.message()
        } else {
            &self.message
        }
    }

    /// Field errors attached by [`AppError::from_field_errors`]
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let fields = self.details.as_ref()?.get("fields")?;
        serde_json::from_value(fields.clone()).ok()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Wrap a non-empty field error map
    ///
    /// Code and message both come from the first failing field, so a single
    /// toast can show it.
    pub fn from_field_errors(errors: &FieldErrors) -> Self {
        let (code, message) = match errors.first() {
            Some((field, msg)) => (ErrorCode::for_field(field), msg.to_string()),
            None => (
                ErrorCode::ValidationFailed,
                ErrorCode::ValidationFailed.message().to_string(),
            ),
        };
        let fields = serde_json::to_value(errors).unwrap_or(Value::Null);
        Self::with_message(code, message).with_detail("fields", fields)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a missing store/channel error
    pub fn channel_not_selected() -> Self {
        Self::new(ErrorCode::ChannelNotSelected)
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NetworkError, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }

    /// Create a partial bulk-delete error listing the ids that failed
    pub fn batch_partial(failed_ids: &[String], total: usize) -> Self {
        Self::with_message(
            ErrorCode::BulkDeletePartial,
            format!("{} of {} coupons could not be deleted", failed_ids.len(), total),
        )
        .with_detail("failed_ids", failed_ids.to_vec())
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
