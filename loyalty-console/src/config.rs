use loyalty_client::ClientConfig;
use std::path::PathBuf;

use crate::error::{ConsoleError, ConsoleResult};
use crate::reconcile::BulkDeletePolicy;

/// Console configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | NEXT_PUBLIC_BACKEND_URL | http://localhost:3000 | Backend base URL (falls back to BACKEND_URL) |
/// | NEXT_PUBLIC_BASE_PATH | (empty) | Prefix for bundled logo assets |
/// | LOYALTY_DATA_DIR | ./data | Where session storage is kept |
/// | LOG_LEVEL | info | Log level (RUST_LOG overrides) |
/// | LOG_JSON | false | JSON log output |
/// | LOG_DIR | (unset) | Directory for daily log files |
/// | REQUEST_TIMEOUT_SECS | 30 | HTTP request timeout |
/// | BULK_DELETE_POLICY | best_effort | best_effort or all_or_nothing |
///
/// # Example
///
/// ```ignore
/// NEXT_PUBLIC_BACKEND_URL=https://loyalty.example.com LOG_LEVEL=debug loyalty-console dashboard
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub backend_url: String,
    pub base_path: String,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub bulk_delete_policy: BulkDeletePolicy,
}

impl ConsoleConfig {
    /// Load from the environment
    ///
    /// Unset or unparseable numbers fall back to their defaults; an unknown
    /// bulk delete policy is an error.
    pub fn from_env() -> ConsoleResult<Self> {
        let bulk_delete_policy = match std::env::var("BULK_DELETE_POLICY") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => BulkDeletePolicy::default(),
        };

        Ok(Self {
            backend_url: std::env::var("NEXT_PUBLIC_BACKEND_URL")
                .or_else(|_| std::env::var("BACKEND_URL"))
                .unwrap_or_else(|_| ClientConfig::DEFAULT_BASE_URL.into()),
            base_path: std::env::var("NEXT_PUBLIC_BASE_PATH").unwrap_or_default(),
            data_dir: std::env::var("LOYALTY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(ClientConfig::DEFAULT_TIMEOUT),
            bulk_delete_policy,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.backend_url).with_timeout(self.request_timeout_secs)
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(ConsoleError::Config(format!(
                "backend URL must start with http:// or https://: {}",
                self.backend_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConsoleError::Config(
                "request timeout must be at least 1 second".into(),
            ));
        }
        Ok(())
    }
}
