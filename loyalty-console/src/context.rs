//! Channel selection context
//!
//! Owns the store id, the channel list and the selected channel, persists
//! the selection, and notifies subscribers whenever the effective
//! (store, channel) scope changes.

use shared::models::{Channel, LoginResponse};
use tokio::sync::watch;

use crate::error::{ConsoleError, ConsoleResult};
use crate::storage::SessionStore;

/// The (store, channel) pair settings are scoped to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelScope {
    pub store_id: Option<String>,
    pub channel_id: Option<String>,
}

impl ChannelScope {
    pub fn new(store_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            store_id: Some(store_id.into()),
            channel_id: Some(channel_id.into()),
        }
    }

    /// Both identifiers, when both are present and non-empty
    pub fn resolved(&self) -> Option<(&str, &str)> {
        let store = self.store_id.as_deref().filter(|s| !s.is_empty())?;
        let channel = self.channel_id.as_deref().filter(|c| !c.is_empty())?;
        Some((store, channel))
    }
}

/// Application context passed to every view
#[derive(Debug)]
pub struct AppContext {
    storage: SessionStore,
    store_id: Option<String>,
    channels: Vec<Channel>,
    selected: Option<Channel>,
    scope_tx: watch::Sender<ChannelScope>,
}

impl AppContext {
    /// Restore the context from storage
    ///
    /// Falls back to the first channel when nothing (or an unknown channel)
    /// was selected.
    pub fn from_storage(storage: SessionStore) -> Self {
        let store_id = storage.store_id().map(str::to_string);
        let channels = storage.channels();
        let stored = storage.selected_channel();
        let (scope_tx, _) = watch::channel(ChannelScope::default());

        let mut ctx = Self {
            storage,
            store_id,
            channels: Vec::new(),
            selected: None,
            scope_tx,
        };
        ctx.selected = stored;
        ctx.apply_channels(channels);
        ctx.publish();
        ctx
    }

    pub fn storage(&self) -> &SessionStore {
        &self.storage
    }

    pub fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn selected_channel(&self) -> Option<&Channel> {
        self.selected.as_ref()
    }

    /// Current scope
    pub fn scope(&self) -> ChannelScope {
        ChannelScope {
            store_id: self.store_id.clone(),
            channel_id: self
                .selected
                .as_ref()
                .and_then(|c| c.scope_id())
                .map(str::to_string),
        }
    }

    /// Receive every scope change
    pub fn subscribe(&self) -> watch::Receiver<ChannelScope> {
        self.scope_tx.subscribe()
    }

    fn publish(&self) {
        let scope = self.scope();
        self.scope_tx.send_if_modified(|current| {
            if *current == scope {
                false
            } else {
                *current = scope;
                true
            }
        });
    }

    /// Keep the selection if it still exists, otherwise pick the first channel
    fn apply_channels(&mut self, channels: Vec<Channel>) {
        let kept = self
            .selected
            .as_ref()
            .and_then(|s| channels.iter().find(|c| c.channel_id == s.channel_id))
            .cloned();
        self.selected = kept.or_else(|| channels.first().cloned());
        self.channels = channels;
    }

    /// Adopt a fresh login
    pub fn login(&mut self, login: &LoginResponse) -> ConsoleResult<()> {
        self.storage.record_login(login)?;
        self.store_id = Some(login.store.id.clone()).filter(|id| !id.is_empty());
        self.selected = None;
        self.apply_channels(login.channels.clone());
        self.publish();
        tracing::info!(
            store = %login.store.hash,
            channels = self.channels.len(),
            "Logged in"
        );
        Ok(())
    }

    /// Replace the channel list, auto-selecting the first when none is selected
    pub fn set_channels(&mut self, channels: Vec<Channel>) -> ConsoleResult<()> {
        self.apply_channels(channels);
        self.storage.set_channels(&self.channels)?;
        self.storage.set_selected_channel(self.selected.as_ref())?;
        self.publish();
        Ok(())
    }

    /// Select a channel by its platform id
    pub fn select_channel(&mut self, channel_id: u64) -> ConsoleResult<Channel> {
        let channel = self
            .channels
            .iter()
            .find(|c| c.channel_id == channel_id)
            .cloned()
            .ok_or(ConsoleError::ChannelNotFound(channel_id))?;

        self.storage.set_selected_channel(Some(&channel))?;
        tracing::info!(channel_id, name = %channel.display_name(), "Channel selected");
        self.selected = Some(channel.clone());
        self.publish();
        Ok(channel)
    }

    /// Drop the session and every scoped value
    pub fn logout(&mut self) -> ConsoleResult<()> {
        self.storage.clear()?;
        self.store_id = None;
        self.channels.clear();
        self.selected = None;
        self.publish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::StoreInfo;
    use tempfile::TempDir;

    fn channel(id: Option<&str>, channel_id: u64) -> Channel {
        Channel {
            id: id.map(str::to_string),
            channel_id,
            channel_name: None,
            channel_type: None,
            platform: None,
            status: None,
        }
    }

    fn login(channels: Vec<Channel>) -> LoginResponse {
        LoginResponse {
            session_token: "tok".into(),
            session_expires_at: i64::MAX,
            store: StoreInfo {
                id: "s1".into(),
                hash: "abc".into(),
                ..Default::default()
            },
            channels,
            channel_count: None,
        }
    }

    fn empty_context(dir: &TempDir) -> AppContext {
        AppContext::from_storage(SessionStore::open(dir.path()).unwrap())
    }

    #[test]
    fn test_scope_requires_both_ids() {
        assert!(ChannelScope::default().resolved().is_none());
        assert!(ChannelScope {
            store_id: Some("s1".into()),
            channel_id: Some(String::new()),
        }
        .resolved()
        .is_none());
        assert_eq!(ChannelScope::new("s1", "c1").resolved(), Some(("s1", "c1")));
    }

    #[test]
    fn test_login_selects_first_channel() {
        let dir = TempDir::new().unwrap();
        let mut ctx = empty_context(&dir);
        assert_eq!(ctx.scope(), ChannelScope::default());

        ctx.login(&login(vec![channel(Some("c1"), 1), channel(Some("c2"), 2)]))
            .unwrap();
        assert_eq!(ctx.scope(), ChannelScope::new("s1", "c1"));
    }

    #[test]
    fn test_selection_survives_restart() {
        let dir = TempDir::new().unwrap();
        let mut ctx = empty_context(&dir);
        ctx.login(&login(vec![channel(Some("c1"), 1), channel(Some("c2"), 2)]))
            .unwrap();
        ctx.select_channel(2).unwrap();
        drop(ctx);

        let ctx = empty_context(&dir);
        assert_eq!(ctx.selected_channel().unwrap().channel_id, 2);
        assert_eq!(ctx.scope(), ChannelScope::new("s1", "c2"));
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut ctx = empty_context(&dir);
        ctx.login(&login(vec![channel(Some("c1"), 1)])).unwrap();
        assert!(matches!(
            ctx.select_channel(99),
            Err(ConsoleError::ChannelNotFound(99))
        ));
    }

    #[test]
    fn test_unsynced_channel_has_no_scope() {
        let dir = TempDir::new().unwrap();
        let mut ctx = empty_context(&dir);
        ctx.login(&login(vec![channel(None, 1)])).unwrap();
        assert!(ctx.scope().resolved().is_none());
    }

    #[test]
    fn test_set_channels_keeps_or_replaces_selection() {
        let dir = TempDir::new().unwrap();
        let mut ctx = empty_context(&dir);
        ctx.login(&login(vec![channel(Some("c1"), 1), channel(Some("c2"), 2)]))
            .unwrap();
        ctx.select_channel(2).unwrap();

        ctx.set_channels(vec![channel(Some("c2"), 2), channel(Some("c3"), 3)])
            .unwrap();
        assert_eq!(ctx.selected_channel().unwrap().channel_id, 2);

        ctx.set_channels(vec![channel(Some("c3"), 3)]).unwrap();
        assert_eq!(ctx.selected_channel().unwrap().channel_id, 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let dir = TempDir::new().unwrap();
        let mut ctx = empty_context(&dir);
        let mut rx = ctx.subscribe();

        ctx.login(&login(vec![channel(Some("c1"), 1), channel(Some("c2"), 2)]))
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ChannelScope::new("s1", "c1"));

        ctx.select_channel(2).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().channel_id.as_deref(), Some("c2"));

        ctx.logout().unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().resolved().is_none());
    }
}
