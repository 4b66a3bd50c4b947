//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or expired session
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 400 / 422 from the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Settings loads treat this as "nothing configured yet"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Server-provided text, if the backend sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(m) | Self::Forbidden(m) | Self::NotFound(m) | Self::Validation(m) => {
                Some(m.as_str()).filter(|m| !m.trim().is_empty())
            }
            Self::Api { message, .. } => Some(message.as_str()).filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(_) => ErrorCode::NetworkError,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InvalidFormat,
            Self::Unauthorized(_) => ErrorCode::NotAuthenticated,
            Self::Forbidden(_) => ErrorCode::PermissionDenied,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Api { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let code = err.code();
        match err.server_message() {
            Some(message) => AppError::with_message(code, message),
            None => AppError::new(code),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_reaches_app_error() {
        let err: AppError = ClientError::Validation("Tier name taken".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.toast_message(), "Tier name taken");
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err: AppError = ClientError::Api {
            status: 502,
            message: String::new(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.toast_message(), ErrorCode::InternalError.message());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ClientError::NotFound("x".into()).is_not_found());
        assert!(!ClientError::Forbidden("x".into()).is_not_found());
    }
}
