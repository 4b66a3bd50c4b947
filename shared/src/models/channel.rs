//! Sales channel model

use serde::{Deserialize, Serialize};

/// Sales channel of a store
///
/// `id` is the backend document id and stays `None` until the channel has
/// been synced; `channel_id` is the platform's own numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub id: Option<String>,
    pub channel_id: u64,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Channel {
    /// Scope key used for settings requests
    ///
    /// Unsynced channels have no settings scope yet.
    pub fn scope_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn display_name(&self) -> String {
        match self.channel_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Channel {}", self.channel_id),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_none_or(|status| status.eq_ignore_ascii_case("active"))
    }
}
