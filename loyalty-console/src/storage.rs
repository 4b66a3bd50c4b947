//! SessionStore - durable client-side state
//!
//! A flat string key/value file with the same keys the browser build keeps
//! in local storage. Values are written through on every change so a
//! restarted process picks up where the last one stopped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Channel, LoginResponse};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const KEY_STORE_ID: &str = "bc_store_id";
pub const KEY_STORE_HASH: &str = "bc_store_hash";
pub const KEY_USER_EMAIL: &str = "bc_user_email";
pub const KEY_SESSION_TOKEN: &str = "bc_session_token";
pub const KEY_SESSION_EXPIRES_AT: &str = "bc_session_expires_at";
pub const KEY_CHANNELS: &str = "bc_channels";
pub const KEY_SELECTED_CHANNEL: &str = "redux_selected_channel";

const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session restored from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub store_id: String,
    pub store_hash: String,
    pub user_email: String,
    pub session_token: String,
    /// Unix milliseconds
    pub session_expires_at: i64,
    pub channels: Vec<Channel>,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.session_expires_at
    }
}

/// Key/value file standing in for browser local storage
#[derive(Debug)]
pub struct SessionStore {
    /// {data_dir}/local_storage.json
    file_path: PathBuf,
    data: BTreeMap<String, String>,
}

impl SessionStore {
    /// Open the store under `data_dir`, starting empty when no file exists
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        let file_path = data_dir.join(STORAGE_FILE);

        let data = if file_path.exists() {
            let content = std::fs::read_to_string(&file_path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { file_path, data })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.data.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Persist everything a login returns and select the first channel
    pub fn record_login(&mut self, login: &LoginResponse) -> Result<(), StorageError> {
        self.data.insert(KEY_STORE_ID.into(), login.store.id.clone());
        self.data.insert(KEY_STORE_HASH.into(), login.store.hash.clone());
        self.data.insert(KEY_USER_EMAIL.into(), login.store.email.clone());
        self.data.insert(KEY_SESSION_TOKEN.into(), login.session_token.clone());
        self.data.insert(
            KEY_SESSION_EXPIRES_AT.into(),
            login.session_expires_at.to_string(),
        );
        self.data
            .insert(KEY_CHANNELS.into(), serde_json::to_string(&login.channels)?);
        match login.default_channel() {
            Some(channel) => {
                self.data
                    .insert(KEY_SELECTED_CHANNEL.into(), serde_json::to_string(channel)?);
            }
            None => {
                self.data.remove(KEY_SELECTED_CHANNEL);
            }
        }
        self.save()
    }

    /// The stored session, if a complete one exists
    pub fn session(&self) -> Option<StoredSession> {
        Some(StoredSession {
            store_id: self.get(KEY_STORE_ID)?.to_string(),
            store_hash: self.get(KEY_STORE_HASH).unwrap_or_default().to_string(),
            user_email: self.get(KEY_USER_EMAIL).unwrap_or_default().to_string(),
            session_token: self.get(KEY_SESSION_TOKEN)?.to_string(),
            session_expires_at: self.get(KEY_SESSION_EXPIRES_AT)?.parse().ok()?,
            channels: self.channels(),
        })
    }

    /// True when there is no session or it has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.session().is_none_or(|s| s.is_expired(now))
    }

    pub fn store_id(&self) -> Option<&str> {
        self.get(KEY_STORE_ID).filter(|id| !id.is_empty())
    }

    /// Stored channel list; unreadable JSON reads as empty
    pub fn channels(&self) -> Vec<Channel> {
        self.get(KEY_CHANNELS)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn set_channels(&mut self, channels: &[Channel]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(channels)?;
        self.set(KEY_CHANNELS, raw)
    }

    pub fn selected_channel(&self) -> Option<Channel> {
        self.get(KEY_SELECTED_CHANNEL)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    pub fn set_selected_channel(&mut self, channel: Option<&Channel>) -> Result<(), StorageError> {
        match channel {
            Some(channel) => {
                let raw = serde_json::to_string(channel)?;
                self.set(KEY_SELECTED_CHANNEL, raw)
            }
            None => self.remove(KEY_SELECTED_CHANNEL),
        }
    }

    /// Forget the session and channel selection
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.data.clear();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::StoreInfo;
    use tempfile::TempDir;

    fn login() -> LoginResponse {
        LoginResponse {
            session_token: "tok".into(),
            session_expires_at: 2_000,
            store: StoreInfo {
                id: "s1".into(),
                hash: "abc".into(),
                email: "owner@shop.test".into(),
                ..Default::default()
            },
            channels: vec![
                Channel {
                    id: Some("c1".into()),
                    channel_id: 1,
                    channel_name: Some("Main".into()),
                    channel_type: None,
                    platform: None,
                    status: None,
                },
                Channel {
                    id: Some("c2".into()),
                    channel_id: 2,
                    channel_name: Some("Outlet".into()),
                    channel_type: None,
                    platform: None,
                    status: None,
                },
            ],
            channel_count: Some(2),
        }
    }

    #[test]
    fn test_record_login_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path()).unwrap();
        assert!(store.session().is_none());

        store.record_login(&login()).unwrap();
        drop(store);

        let store = SessionStore::open(dir.path()).unwrap();
        let session = store.session().unwrap();
        assert_eq!(session.store_id, "s1");
        assert_eq!(session.store_hash, "abc");
        assert_eq!(session.user_email, "owner@shop.test");
        assert_eq!(session.session_token, "tok");
        assert_eq!(session.channels.len(), 2);
        assert_eq!(store.selected_channel().unwrap().channel_id, 1);
        assert_eq!(store.get(KEY_SESSION_EXPIRES_AT), Some("2000"));
    }

    #[test]
    fn test_expiry() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path()).unwrap();
        let before = DateTime::from_timestamp_millis(1_999).unwrap();
        let after = DateTime::from_timestamp_millis(2_000).unwrap();
        assert!(store.is_expired(before));

        store.record_login(&login()).unwrap();
        assert!(!store.is_expired(before));
        assert!(store.is_expired(after));
    }

    #[test]
    fn test_clear_and_selection() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path()).unwrap();
        store.record_login(&login()).unwrap();

        let outlet = store.channels()[1].clone();
        store.set_selected_channel(Some(&outlet)).unwrap();
        assert_eq!(store.selected_channel(), Some(outlet));

        store.set_selected_channel(None).unwrap();
        assert!(store.selected_channel().is_none());

        store.clear().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        assert!(store.session().is_none());
        assert!(store.channels().is_empty());
    }

    #[test]
    fn test_corrupt_channel_json_reads_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path()).unwrap();
        store.set(KEY_CHANNELS, "not json").unwrap();
        assert!(store.channels().is_empty());
    }
}
