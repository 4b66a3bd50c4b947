//! Login DTOs

use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::store_info::StoreInfo;

/// Body of `POST /api/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub signed_payload: String,
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_token: String,
    /// Unix milliseconds
    pub session_expires_at: i64,
    pub store: StoreInfo,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub channel_count: Option<usize>,
}

impl LoginResponse {
    /// First channel, selected by default after login
    pub fn default_channel(&self) -> Option<&Channel> {
        self.channels.first()
    }
}
