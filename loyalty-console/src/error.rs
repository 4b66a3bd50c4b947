//! Console error types

use loyalty_client::ClientError;
use shared::error::{AppError, ErrorCode};
use shared::validation::FieldErrors;
use thiserror::Error;

use crate::storage::StorageError;

/// Console error type
///
/// Every variant is recoverable; the view shows [`ConsoleError::toast_message`]
/// and the user may retry.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Local validation failed; nothing was sent
    #[error("Please fix the errors in the form")]
    Validation(FieldErrors),

    /// No store or channel selected
    #[error("Store ID or Channel ID is missing")]
    MissingScope,

    #[error("Channel not found: {0}")]
    ChannelNotFound(u64),

    #[error("Not logged in")]
    NotLoggedIn,

    /// Backend answered `success: false`
    #[error("{0}")]
    Rejected(String),

    /// Some deletes in a batch failed; succeeded ones are not rolled back
    #[error("{} of {total} coupons could not be deleted", failed_ids.len())]
    PartialDelete { failed_ids: Vec<String>, total: usize },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text for a transient notification
    pub fn toast_message(&self) -> String {
        AppError::from(self).toast_message().to_string()
    }
}

impl From<&ConsoleError> for AppError {
    fn from(err: &ConsoleError) -> Self {
        match err {
            ConsoleError::Validation(errors) => AppError::from_field_errors(errors),
            ConsoleError::MissingScope => AppError::channel_not_selected(),
            ConsoleError::ChannelNotFound(id) => {
                AppError::new(ErrorCode::ChannelNotFound).with_detail("channel_id", *id)
            }
            ConsoleError::NotLoggedIn => AppError::not_authenticated(),
            ConsoleError::Rejected(message) => AppError::internal(message.clone()),
            ConsoleError::PartialDelete { failed_ids, total } => {
                AppError::batch_partial(failed_ids, *total)
            }
            ConsoleError::Client(e) => {
                let code = e.code();
                match e.server_message() {
                    Some(message) => AppError::with_message(code, message),
                    None => AppError::new(code),
                }
            }
            ConsoleError::Storage(e) => AppError::storage(e.to_string()),
            ConsoleError::Config(message) => AppError::with_message(ErrorCode::ConfigError, message),
        }
    }
}

impl From<ConsoleError> for AppError {
    fn from(err: ConsoleError) -> Self {
        AppError::from(&err)
    }
}

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
