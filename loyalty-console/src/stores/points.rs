//! Point currency and tier settings

use loyalty_client::{ClientResult, LogoUpload};
use rust_decimal::Decimal;
use shared::form::{FloatPolicy, IntegerPolicy, sanitize_float, sanitize_integer, sanitize_name};
use shared::models::{
    CustomPointName, Logo, PREDEFINED_POINT_NAMES, PointSettings, Tier,
};
use shared::validation::{FieldErrors, validate_point_settings, validate_required_name};
use std::str::FromStr;

use super::source::SettingsSource;
use super::tokens::{LoadRequest, LoadTicket, RequestTokens};
use crate::context::ChannelScope;
use crate::error::{ConsoleError, ConsoleResult};

#[derive(Debug, Default)]
pub struct PointsStore {
    settings: PointSettings,
    scope: ChannelScope,
    tokens: RequestTokens,
    pending_upload: Option<LogoUpload>,
    errors: FieldErrors,
    loading: bool,
    base_path: String,
}

impl PointsStore {
    /// `base_path` prefixes the predefined logo assets
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &PointSettings {
        &self.settings
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A server id has been observed; the next save is an update
    pub fn is_edit_mode(&self) -> bool {
        self.settings.is_persisted()
    }

    pub fn pending_upload(&self) -> Option<&LogoUpload> {
        self.pending_upload.as_ref()
    }

    fn reset(&mut self) {
        self.settings = PointSettings::default();
        self.pending_upload = None;
        self.errors = FieldErrors::new();
    }

    // ========== Load ==========

    /// Start a load for `scope`
    ///
    /// An incomplete scope resets every field to its default and returns
    /// `None`; nothing of the previous channel survives a switch.
    pub fn begin_load(&mut self, scope: &ChannelScope) -> Option<LoadRequest> {
        self.scope = scope.clone();
        let (_, request) = LoadRequest::issue(&mut self.tokens, scope);
        if request.is_none() {
            self.reset();
        }
        self.loading = request.is_some();
        request
    }

    /// Apply a load response; returns `false` when the ticket is stale
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: ClientResult<Option<PointSettings>>,
    ) -> bool {
        if !self.tokens.is_current(ticket) {
            tracing::debug!(ticket = ticket.value(), "Discarding stale points response");
            return false;
        }
        self.loading = false;

        match outcome {
            Ok(Some(settings)) => {
                self.settings = settings.normalized();
                self.pending_upload = None;
                self.errors = FieldErrors::new();
            }
            Ok(None) => self.reset(),
            Err(e) if e.is_not_found() => self.reset(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load point settings, keeping current values");
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
            .load_points(&request.store_id, &request.channel_id)
            .await;
        self.finish_load(request.ticket, outcome)
    }

    // ========== Setters ==========

    pub fn set_point_name(&mut self, raw: &str) {
        self.settings.point_name = sanitize_name(raw);
        self.errors.clear_field("pointName");
    }

    /// Pick a predefined or previously added custom name
    pub fn select_point_name(&mut self, name: &str) {
        self.settings.point_name = name.to_string();
        for custom in &mut self.settings.custom_point_name {
            custom.active = custom.name == name;
        }
        self.errors.clear_field("pointName");
    }

    /// Add a merchant-defined name and select it
    ///
    /// Names already offered (case-insensitive) are selected instead of
    /// being added twice.
    pub fn add_custom_point_name(&mut self, raw: &str) -> Result<(), String> {
        let name = sanitize_name(raw).trim().to_string();
        if let Some(message) = validate_required_name(&name, "Point name") {
            return Err(message);
        }

        let known = PREDEFINED_POINT_NAMES
            .iter()
            .copied()
            .chain(self.settings.custom_point_name.iter().map(|c| c.name.as_str()))
            .find(|existing| existing.eq_ignore_ascii_case(&name))
            .map(str::to_string);

        match known {
            Some(existing) => self.select_point_name(&existing),
            None => {
                self.settings.custom_point_name.push(CustomPointName {
                    name: name.clone(),
                    active: false,
                });
                self.select_point_name(&name);
            }
        }
        Ok(())
    }

    pub fn set_expiry(&mut self, enabled: bool) {
        self.settings.expiry = enabled;
        if !enabled {
            self.settings.expiries_in_days = None;
            self.errors.clear_field("expiriesInDays");
        }
    }

    /// Returns the sanitized text to show
    pub fn set_expiry_days(&mut self, raw: &str) -> String {
        let text = sanitize_integer(raw, IntegerPolicy::EXPIRY_DAYS);
        self.settings.expiries_in_days = text.parse().ok();
        self.errors.clear_field("expiriesInDays");
        text
    }

    pub fn set_tier_status(&mut self, enabled: bool) {
        self.settings.tier_status = enabled;
    }

    pub fn set_tier_name(&mut self, index: usize, raw: &str) {
        if let Some(tier) = self.settings.tier.get_mut(index) {
            tier.tier_name = sanitize_name(raw);
            self.errors.clear_field(&format!("tier.{index}.tierName"));
        }
    }

    /// Returns the sanitized text; the base tier stays at 0
    pub fn set_tier_threshold(&mut self, index: usize, raw: &str) -> String {
        if index == 0 {
            return "0".to_string();
        }
        let text = sanitize_integer(raw, IntegerPolicy::POINT_THRESHOLD);
        if let Some(tier) = self.settings.tier.get_mut(index) {
            tier.point_required = text.parse().unwrap_or(0);
            self.errors.clear_field(&format!("tier.{index}.pointRequired"));
        }
        text
    }

    /// Returns the sanitized text; the base tier stays at 1
    pub fn set_tier_multiplier(&mut self, index: usize, raw: &str) -> String {
        if index == 0 {
            return "1".to_string();
        }
        let text = sanitize_float(raw, FloatPolicy::MULTIPLIER);
        if let Some(tier) = self.settings.tier.get_mut(index) {
            tier.multiplier =
                Decimal::from_str(text.trim_end_matches('.')).unwrap_or(Decimal::ZERO);
            self.errors.clear_field(&format!("tier.{index}.multiplier"));
        }
        text
    }

    /// Choose one of the built-in logos; drops any custom upload
    pub fn select_logo(&mut self, index: usize) -> bool {
        let Some(logo) = Logo::predefined(index, &self.base_path) else {
            return false;
        };
        self.settings.logo = Some(logo);
        self.settings.custom_logo = None;
        self.pending_upload = None;
        self.errors.clear_field("logo");
        true
    }

    /// Attach a custom logo file, sent with the next save
    pub fn set_custom_logo(&mut self, upload: LogoUpload) {
        self.settings.logo = None;
        self.pending_upload = Some(upload);
        self.errors.clear_field("logo");
    }

    // ========== Save ==========

    /// Validate and persist
    ///
    /// Creates on first save and updates once a server id is known. Returns
    /// the message to show.
    pub async fn save<S>(&mut self, source: &S) -> ConsoleResult<String>
    where
        S: SettingsSource + ?Sized,
    {
        let errors = validate_point_settings(&self.settings, self.pending_upload.is_some());
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(ConsoleError::Validation(errors));
        }
        self.errors = FieldErrors::new();

        let (store_id, channel_id) = self
            .scope
            .resolved()
            .map(|(s, c)| (s.to_string(), c.to_string()))
            .ok_or(ConsoleError::MissingScope)?;

        Tier::lock_base(&mut self.settings.tier);
        let upload = self.pending_upload.clone();

        let response = match self.settings.id.clone().filter(|id| !id.is_empty()) {
            Some(point_id) => {
                source
                    .update_points(&point_id, &self.settings, upload)
                    .await?
            }
            None => {
                source
                    .create_points(&store_id, &channel_id, &self.settings, upload)
                    .await?
            }
        };

        if !response.success {
            return Err(ConsoleError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Failed to save point settings".to_string()),
            ));
        }

        if let Some(saved) = response.data {
            if let Some(id) = saved.id.filter(|id| !id.is_empty()) {
                self.settings.id = Some(id);
            }
            if saved.custom_logo.is_some() {
                self.settings.custom_logo = saved.custom_logo;
            }
        }
        self.pending_upload = None;

        tracing::info!(
            store_id = %store_id,
            channel_id = %channel_id,
            point_id = ?self.settings.id,
            "Point settings saved"
        );
        Ok(response
            .message
            .unwrap_or_else(|| "Point settings saved successfully".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_channel_resets_to_defaults() {
        let mut store = PointsStore::new("");
        store.set_point_name("Gems");
        store.set_expiry(true);
        store.set_tier_status(true);

        assert!(store.begin_load(&ChannelScope::new("s1", "")).is_none());
        assert_eq!(store.settings(), &PointSettings::default());
        assert_eq!(store.settings().point_name, "Points");
        assert!(!store.settings().expiry);
        assert_eq!(store.settings().tier, Tier::canonical_defaults());
    }

    #[test]
    fn test_base_tier_is_locked() {
        let mut store = PointsStore::new("");
        assert_eq!(store.set_tier_threshold(0, "500"), "0");
        assert_eq!(store.set_tier_multiplier(0, "3"), "1");
        assert_eq!(store.settings().tier[0].point_required, 0);
        assert_eq!(store.settings().tier[0].multiplier, Decimal::ONE);
    }

    #[test]
    fn test_multiplier_clamps_to_ceiling() {
        let mut store = PointsStore::new("");
        assert_eq!(store.set_tier_multiplier(1, "15.7"), "9.99");
        assert_eq!(store.settings().tier[1].multiplier, Decimal::new(999, 2));
    }

    #[test]
    fn test_custom_point_name_dedupes() {
        let mut store = PointsStore::new("");
        store.add_custom_point_name("Sparkles").unwrap();
        store.add_custom_point_name("sparkles").unwrap();
        store.add_custom_point_name("gems").unwrap();

        let settings = store.settings();
        assert_eq!(settings.custom_point_name.len(), 1);
        assert_eq!(settings.point_name, "Gems");
        assert!(!settings.custom_point_name[0].active);
        assert!(store.add_custom_point_name("   ").is_err());
    }

    #[test]
    fn test_logo_choice_is_exclusive() {
        let mut store = PointsStore::new("/loyalty");
        store.set_custom_logo(LogoUpload::new("mine.png", vec![1, 2, 3]));
        assert!(store.pending_upload().is_some());

        assert!(store.select_logo(2));
        assert!(store.pending_upload().is_none());
        assert_eq!(
            store.settings().logo.as_ref().unwrap().src,
            "/loyalty/images/point-icon3.svg"
        );
        assert!(!store.select_logo(42));
    }

    #[test]
    fn test_expiry_days_clamped() {
        let mut store = PointsStore::new("");
        store.set_expiry(true);
        assert_eq!(store.set_expiry_days("900"), "365");
        assert_eq!(store.settings().expiries_in_days, Some(365));

        store.set_expiry(false);
        assert_eq!(store.settings().expiries_in_days, None);
    }
}
