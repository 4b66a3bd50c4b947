//! Shared types for the loyalty console
//!
//! Wire models, error codes, input sanitizers and validation rules used by
//! both the API client and the console.

pub mod error;
pub mod form;
pub mod models;
pub mod response;
pub mod validation;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use response::{ErrorBody, SaveResponse, extract_data};
pub use validation::FieldErrors;
