//! Store Info Model

use serde::{Deserialize, Serialize};

/// Storefront the console is installed on
///
/// Only `id`, `hash` and `email` are guaranteed; the rest is whatever the
/// platform reported at install time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub hash: String,
    /// Older backends only send `userEmail`
    #[serde(default, alias = "userEmail")]
    pub email: String,
    pub user_id: Option<String>,
    pub store_name: Option<String>,
    pub store_domain: Option<String>,
    pub store_url: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub installed_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl StoreInfo {
    /// Name to show in headers, falling back to the store hash
    pub fn display_name(&self) -> &str {
        self.store_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.hash)
    }
}
