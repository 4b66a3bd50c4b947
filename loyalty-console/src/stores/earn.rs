//! Ways-to-earn settings

use chrono::NaiveDate;
use loyalty_client::ClientResult;
use shared::form::{IntegerPolicy, sanitize_integer};
use shared::models::{CollectSettings, EarnRuleKind, Event};
use shared::validation::{FieldErrors, validate_collect_settings};

use super::source::SettingsSource;
use super::tokens::{LoadRequest, LoadTicket, RequestTokens};
use crate::context::ChannelScope;
use crate::error::{ConsoleError, ConsoleResult};
use crate::guard::{ChangeGuard, LeaveDecision, NavigationPort};
use crate::reconcile::EventList;

#[derive(Debug)]
pub struct EarnStore {
    settings: CollectSettings,
    events: EventList,
    guard: ChangeGuard<Vec<Event>>,
    scope: ChannelScope,
    tokens: RequestTokens,
    errors: FieldErrors,
    loading: bool,
}

impl Default for EarnStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EarnStore {
    pub fn new() -> Self {
        Self {
            settings: CollectSettings::default(),
            events: EventList::default(),
            guard: ChangeGuard::new(Vec::new()),
            scope: ChannelScope::default(),
            tokens: RequestTokens::default(),
            errors: FieldErrors::new(),
            loading: false,
        }
    }

    pub fn settings(&self) -> &CollectSettings {
        &self.settings
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_edit_mode(&self) -> bool {
        self.settings.is_persisted()
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventList {
        &mut self.events
    }

    /// Add the event in the add form
    pub fn add_event(&mut self, today: NaiveDate) -> Result<(), FieldErrors> {
        self.events.add(today).map(|_| ())
    }

    fn adopt(&mut self, settings: CollectSettings) {
        let events = settings.event.events.clone();
        self.settings = settings;
        self.events.replace(events);
        self.guard.reset(&self.events.items().to_vec());
        self.errors = FieldErrors::new();
    }

    // ========== Load ==========

    pub fn begin_load(&mut self, scope: &ChannelScope) -> Option<LoadRequest> {
        self.scope = scope.clone();
        let (_, request) = LoadRequest::issue(&mut self.tokens, scope);
        if request.is_none() {
            self.adopt(CollectSettings::default());
        }
        self.loading = request.is_some();
        request
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: ClientResult<Option<CollectSettings>>,
    ) -> bool {
        if !self.tokens.is_current(ticket) {
            tracing::debug!(ticket = ticket.value(), "Discarding stale collect response");
            return false;
        }
        self.loading = false;

        match outcome {
            Ok(Some(settings)) => self.adopt(settings),
            Ok(None) => self.adopt(CollectSettings::default()),
            Err(e) if e.is_not_found() => self.adopt(CollectSettings::default()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load collect settings, keeping current values");
            }
        }
        true
    }

    pub async fn load<S>(&mut self, source: &S, scope: &ChannelScope) -> bool
    where
        S: SettingsSource + ?Sized,
    {
        let Some(request) = self.begin_load(scope) else {
            return true;
        };
        let outcome = source
            .load_collect(&request.store_id, &request.channel_id)
            .await;
        self.finish_load(request.ticket, outcome)
    }

    /// Re-fetch to pick up event processing progress
    ///
    /// Skipped while there are unsaved event changes so they are not lost.
    pub async fn refresh<S>(&mut self, source: &S) -> bool
    where
        S: SettingsSource + ?Sized,
    {
        if self.is_dirty() {
            tracing::debug!("Unsaved event changes, skipping refresh");
            return false;
        }
        let scope = self.scope.clone();
        self.load(source, &scope).await
    }

    // ========== Setters ==========

    pub fn set_rule_active(&mut self, kind: EarnRuleKind, active: bool) {
        self.settings.rule_mut(kind).active = active;
        self.errors.clear_field("earnRules");
    }

    /// Returns the sanitized text to show
    pub fn set_rule_points(&mut self, kind: EarnRuleKind, raw: &str) -> String {
        let text = sanitize_integer(raw, IntegerPolicy::GENERAL);
        self.settings.rule_mut(kind).point = text.parse().unwrap_or(0);
        self.errors.clear_field("earnRules");
        text
    }

    pub fn set_events_active(&mut self, active: bool) {
        self.settings.event.active = active;
    }

    pub fn set_rejoin_active(&mut self, active: bool) {
        self.settings.rejoin.active = active;
        if !active {
            self.errors.clear_field("dayOfRecall");
            self.errors.clear_field("pointRejoin");
        }
    }

    pub fn set_rejoin_days(&mut self, raw: &str) -> String {
        let text = sanitize_integer(raw, IntegerPolicy::EXPIRY_DAYS);
        self.settings.rejoin.day_of_recall = text.parse().unwrap_or(0);
        self.errors.clear_field("dayOfRecall");
        text
    }

    pub fn set_rejoin_points(&mut self, raw: &str) -> String {
        let text = sanitize_integer(raw, IntegerPolicy::GENERAL);
        self.settings.rejoin.point_rejoin = text.parse().unwrap_or(0);
        self.errors.clear_field("pointRejoin");
        text
    }

    // ========== Change guard ==========

    /// Events differ from the last save
    pub fn is_dirty(&self) -> bool {
        self.guard.is_dirty(&self.events.items().to_vec())
    }

    pub fn request_leave(&mut self, target: &str, port: &mut impl NavigationPort) -> LeaveDecision {
        let live = self.events.items().to_vec();
        self.guard.route(&live, target, port)
    }

    pub fn before_unload(&self) -> Option<&'static str> {
        self.guard.before_unload(&self.events.items().to_vec())
    }

    pub fn cancel_leave(&mut self) {
        self.guard.cancel_leave();
    }

    pub fn navigation_settled(&mut self) {
        self.guard.navigation_settled();
    }

    /// Revert events to the last save; returns the pending target
    pub fn discard_then_leave(&mut self) -> Option<String> {
        self.events.cancel_edit();
        self.guard.discard_then_leave(self.events.items_mut())
    }

    // ========== Save ==========

    /// Validate and persist rules, rejoin and events; returns the message to show
    pub async fn save<S>(&mut self, source: &S) -> ConsoleResult<String>
    where
        S: SettingsSource + ?Sized,
    {
        let live = self.events.items().to_vec();
        let result = persist_collect(source, &self.scope, &mut self.settings, &live).await;
        let (message, events) = self.record(result)?;
        self.events.replace(events);
        self.guard.mark_saved(&self.events.items().to_vec());
        Ok(message)
    }

    /// Save, then release the pending navigation target
    ///
    /// On failure the prompt stays open and nothing navigates.
    pub async fn save_then_leave<S>(&mut self, source: &S) -> ConsoleResult<(String, Option<String>)>
    where
        S: SettingsSource + ?Sized,
    {
        let live = self.events.items().to_vec();
        let save = persist_collect(source, &self.scope, &mut self.settings, &live);
        let result = self.guard.save_then_leave(&live, save).await;
        let ((message, events), target) = self.record(result)?;
        self.events.replace(events);
        self.guard.mark_saved(&self.events.items().to_vec());
        Ok((message, target))
    }

    /// Keep the inline errors in step with the last save attempt
    fn record<T>(&mut self, result: ConsoleResult<T>) -> ConsoleResult<T> {
        match &result {
            Ok(_) => self.errors = FieldErrors::new(),
            Err(ConsoleError::Validation(errors)) => self.errors = errors.clone(),
            Err(_) => {}
        }
        result
    }
}

/// Validate, send, and adopt the server id
///
/// Returns the message to show and the events as the server stored them.
async fn persist_collect<S>(
    source: &S,
    scope: &ChannelScope,
    settings: &mut CollectSettings,
    events: &[Event],
) -> ConsoleResult<(String, Vec<Event>)>
where
    S: SettingsSource + ?Sized,
{
    let errors = validate_collect_settings(settings);
    if !errors.is_empty() {
        return Err(ConsoleError::Validation(errors));
    }
    let (store_id, channel_id) = scope.resolved().ok_or(ConsoleError::MissingScope)?;

    settings.event.events = events.to_vec();
    let response = match settings.id.clone().filter(|id| !id.is_empty()) {
        Some(collect_id) => source.update_collect(&collect_id, settings).await?,
        None => source.create_collect(store_id, channel_id, settings).await?,
    };

    if !response.success {
        return Err(ConsoleError::Rejected(
            response
                .message
                .unwrap_or_else(|| "Failed to save ways to earn".to_string()),
        ));
    }

    let mut saved_events = events.to_vec();
    if let Some(saved) = response.data {
        if let Some(id) = saved.id.filter(|id| !id.is_empty()) {
            settings.id = Some(id);
        }
        if saved.event.events.len() == events.len() {
            saved_events = saved.event.events;
        }
    }
    settings.event.events = saved_events.clone();

    tracing::info!(
        store_id = %store_id,
        channel_id = %channel_id,
        events = saved_events.len(),
        "Collect settings saved"
    );
    let message = response
        .message
        .unwrap_or_else(|| "Ways to earn saved successfully".to_string());
    Ok((message, saved_events))
}
