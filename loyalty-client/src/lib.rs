//! Loyalty Client - HTTP client for the loyalty backend
//!
//! Provides the REST calls the console makes: login, store and channel
//! lookup, and CRUD on the points, ways-to-earn and ways-to-redeem settings.

pub mod config;
pub mod error;
pub mod http;
pub mod upload;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{BatchDeleteReport, HttpClient};
pub use upload::LogoUpload;

// Re-export shared types for convenience
pub use shared::models::{Channel, LoginResponse, StoreInfo};
pub use shared::response::SaveResponse;
