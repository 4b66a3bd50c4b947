//! Form validation rules
//!
//! Every rule is a pure function of form state. Rules never fail hard: they
//! collect messages into a [`FieldErrors`] map and the caller refuses to submit
//! while it is non-empty.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::form::MAX_NAME_LEN;
use crate::models::{
    CollectSettings, EarnRule, EarnRuleKind, EventForm, EventOccasion, PointSettings, RejoinRule,
};

// ── Ranges ──────────────────────────────────────────────────────────

pub const EVENT_POINTS: (u32, u32) = (1, 10_000);
pub const REJOIN_DAYS: (u32, u32) = (1, 365);
pub const REJOIN_POINTS: (u32, u32) = (1, 10_000);
pub const REDEEM_POINT_VALUE: (u32, u32) = (1, 100_000);
pub const DISCOUNT_PERCENT: (u32, u32) = (1, 100);
pub const EXPIRY_DAYS: (u32, u32) = (1, 365);

/// Highest tier multiplier
pub const MAX_MULTIPLIER: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

// ── Messages ────────────────────────────────────────────────────────

pub const MSG_EVENT_INCOMPLETE: &str =
    "Please fill in all fields: Event Name, Date of Event, and Points";
pub const MSG_EVENT_POINTS: &str = "Points must be between 1-10000";
pub const MSG_EVENT_PAST: &str =
    "Event date cannot be in the past. Please select today or a future date.";
pub const MSG_LOGO_REQUIRED: &str = "Please select or upload a logo";
pub const MSG_POINT_VALUE: &str = "Point value must be between 1 and 100000 (whole numbers only)";
pub const MSG_DISCOUNT_PERCENT: &str =
    "Discount amount must be between 1 and 100 (whole numbers only)";
pub const MSG_EXPIRY_DAYS: &str = "Expiry days must be between 1 and 365 (whole numbers only)";

/// Ordered field -> message map
///
/// Insertion order is kept so the first error (the one scrolled into view)
/// is well defined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message for `field`, keeping its original position if present
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|e| e.field == field) {
            Some(existing) => existing.message = message,
            None => self.0.push(FieldError {
                field: field.to_string(),
                message,
            }),
        }
    }

    /// Insert when a rule produced a message
    pub fn check(&mut self, field: &str, outcome: Option<String>) {
        if let Some(message) = outcome {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.0
            .first()
            .map(|e| (e.field.as_str(), e.message.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|e| (e.field.as_str(), e.message.as_str()))
    }

    pub fn clear_field(&mut self, field: &str) {
        self.0.retain(|e| e.field != field);
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for error in other.0 {
            self.insert(&error.field, error.message);
        }
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// ── Single-field rules ──────────────────────────────────────────────

/// Non-empty after trimming, letters/digits/spaces, at most 30 characters
pub fn validate_required_name(value: &str, label: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{label} is required"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Some(format!("{label} can only contain letters, numbers and spaces"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Some(format!("{label} must be {MAX_NAME_LEN} characters or less"));
    }
    None
}

/// Whole number within `range` (inclusive)
pub fn validate_int_range(text: &str, range: (u32, u32), message: &str) -> Option<String> {
    match text.trim().parse::<u64>() {
        Ok(v) if v >= u64::from(range.0) && v <= u64::from(range.1) => None,
        _ => Some(message.to_string()),
    }
}

/// Optional whole number: blank passes, anything else must be in `range`
pub fn validate_optional_int_range(text: &str, range: (u32, u32), message: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    validate_int_range(text, range, message)
}

/// Tier multiplier in (0, 9.99]
pub fn validate_multiplier(value: Decimal) -> Option<String> {
    if value <= Decimal::ZERO || value > MAX_MULTIPLIER {
        return Some("Multiplier must be greater than 0 and at most 9.99".to_string());
    }
    None
}

/// Calendar day comparison, so time zone offsets never reject "today"
pub fn validate_event_date(date: NaiveDate, today: NaiveDate) -> Option<String> {
    if date < today {
        return Some(MSG_EVENT_PAST.to_string());
    }
    None
}

/// One of: a picked predefined logo, a pending upload, or a stored logo
pub fn validate_logo_present(settings: &PointSettings, has_pending_upload: bool) -> Option<String> {
    if has_pending_upload || settings.logo.is_some() || settings.custom_logo.is_some() {
        None
    } else {
        Some(MSG_LOGO_REQUIRED.to_string())
    }
}

/// Every enabled toggle needs a non-zero value
///
/// All violations are reported in one message.
pub fn validate_toggles<'a>(rules: impl IntoIterator<Item = (&'a str, EarnRule)>) -> Option<String> {
    let missing: Vec<&str> = rules
        .into_iter()
        .filter(|(_, rule)| rule.active && rule.point == 0)
        .map(|(label, _)| label)
        .collect();
    if missing.is_empty() {
        return None;
    }
    Some(format!(
        "Please enter a value of at least 1 for: {}",
        missing.join(", ")
    ))
}

// ── Form validators ─────────────────────────────────────────────────

pub fn validate_point_settings(settings: &PointSettings, has_pending_upload: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check("pointName", validate_required_name(&settings.point_name, "Point name"));
    errors.check("logo", validate_logo_present(settings, has_pending_upload));

    if settings.expiry {
        let days = settings.expiries_in_days.map(|d| d.to_string()).unwrap_or_default();
        errors.check(
            "expiriesInDays",
            validate_int_range(&days, EXPIRY_DAYS, "Expiry days must be between 1 and 365"),
        );
    }

    if settings.tier_status {
        for (i, tier) in settings.tier.iter().enumerate() {
            errors.check(
                &format!("tier.{i}.tierName"),
                validate_required_name(&tier.tier_name, "Tier name"),
            );
            if i > 0 {
                errors.check(&format!("tier.{i}.multiplier"), validate_multiplier(tier.multiplier));
            }
        }
    }
    errors
}

/// Add/edit event form
///
/// Completeness is checked first and short-circuits, then name, range and
/// date. Predefined occasion labels are taken as they are; free-text names
/// follow the usual name rules.
pub fn validate_event_form(form: &EventForm, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let points = form.points.trim();
    let date = match form.date {
        Some(date) if !form.name.trim().is_empty() && !points.is_empty() && points != "0" => date,
        _ => {
            errors.insert("event", MSG_EVENT_INCOMPLETE);
            return errors;
        }
    };

    if !EventOccasion::is_predefined_label(&form.name) {
        errors.check("name", validate_required_name(&form.name, "Event name"));
    }
    errors.check("points", validate_int_range(points, EVENT_POINTS, MSG_EVENT_POINTS));
    errors.check("date", validate_event_date(date, today));
    errors
}

pub fn validate_rejoin(rule: &RejoinRule) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !rule.active {
        return errors;
    }
    errors.check(
        "dayOfRecall",
        validate_int_range(
            &rule.day_of_recall.to_string(),
            REJOIN_DAYS,
            "Recall days must be between 1 and 365",
        ),
    );
    errors.check(
        "pointRejoin",
        validate_int_range(
            &rule.point_rejoin.to_string(),
            REJOIN_POINTS,
            "Rejoin points must be between 1 and 10000",
        ),
    );
    errors
}

pub fn validate_collect_settings(settings: &CollectSettings) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(
        "earnRules",
        validate_toggles(
            EarnRuleKind::ALL
                .iter()
                .map(|kind| (kind.label(), settings.rule(*kind))),
        ),
    );
    errors.merge(validate_rejoin(&settings.rejoin));
    errors
}

pub fn validate_percentage_discount(point_value: &str, discount: &str, expire: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(
        "pointValue",
        validate_int_range(point_value, REDEEM_POINT_VALUE, MSG_POINT_VALUE),
    );
    errors.check(
        "discountAmount",
        validate_int_range(discount, DISCOUNT_PERCENT, MSG_DISCOUNT_PERCENT),
    );
    errors.check(
        "expireCoupon",
        validate_optional_int_range(expire, EXPIRY_DAYS, MSG_EXPIRY_DAYS),
    );
    errors
}

/// `max_points` is `None` when the per-redemption cap is switched off
pub fn validate_fixed_discount(points_per_unit: &str, expire: &str, max_points: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(
        "pointValue",
        validate_int_range(points_per_unit, REDEEM_POINT_VALUE, MSG_POINT_VALUE),
    );
    errors.check(
        "expireCoupon",
        validate_optional_int_range(expire, EXPIRY_DAYS, MSG_EXPIRY_DAYS),
    );
    if let Some(max) = max_points {
        errors.check(
            "maxPoints",
            validate_int_range(max, REDEEM_POINT_VALUE, "Maximum points must be between 1 and 100000"),
        );
    }
    errors
}

/// `minimum_purchase` is `None` when the minimum purchase toggle is off
pub fn validate_free_shipping(point_value: &str, expire: &str, minimum_purchase: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(
        "pointValue",
        validate_int_range(point_value, REDEEM_POINT_VALUE, MSG_POINT_VALUE),
    );
    errors.check(
        "expireCoupon",
        validate_optional_int_range(expire, EXPIRY_DAYS, MSG_EXPIRY_DAYS),
    );
    if let Some(amount) = minimum_purchase {
        let valid = amount
            .trim()
            .trim_end_matches('.')
            .parse::<Decimal>()
            .is_ok_and(|v| v > Decimal::ZERO);
        if !valid {
            errors.insert("minimumPurchase", "Minimum purchase amount must be greater than 0");
        }
    }
    errors
}

pub fn validate_free_product(point_value: &str, expire: &str, selected_products: usize) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(
        "pointValue",
        validate_int_range(point_value, REDEEM_POINT_VALUE, MSG_POINT_VALUE),
    );
    errors.check(
        "expireCoupon",
        validate_optional_int_range(expire, EXPIRY_DAYS, MSG_EXPIRY_DAYS),
    );
    if selected_products == 0 {
        errors.insert("products", "Please select at least one product");
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Logo, Tier};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_field_errors_keep_order() {
        let mut errors = FieldErrors::new();
        errors.insert("b", "second");
        errors.insert("a", "first");
        errors.insert("b", "replaced");
        assert_eq!(errors.first(), Some(("b", "replaced")));
        assert_eq!(errors.get("a"), Some("first"));
        assert_eq!(errors.len(), 2);

        errors.clear_field("b");
        assert_eq!(errors.first(), Some(("a", "first")));
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_required_name() {
        assert!(validate_required_name("Gold", "Tier name").is_none());
        assert_eq!(
            validate_required_name("   ", "Tier name").as_deref(),
            Some("Tier name is required")
        );
        assert!(validate_required_name("Gold!", "Tier name").is_some());
        assert!(validate_required_name(&"a".repeat(31), "Tier name").is_some());
    }

    #[test]
    fn test_disabled_toggle_always_passes() {
        for point in [0, 1, 99_999] {
            assert!(validate_toggles([("Birthday", EarnRule::new(false, point))]).is_none());
        }
    }

    #[test]
    fn test_enabled_toggle_needs_value() {
        assert!(validate_toggles([("Birthday", EarnRule::new(true, 5))]).is_none());
        let message = validate_toggles([
            ("Sign up", EarnRule::new(true, 0)),
            ("Every purchase", EarnRule::new(true, 10)),
            ("Birthday", EarnRule::new(true, 0)),
        ])
        .unwrap();
        assert_eq!(message, "Please enter a value of at least 1 for: Sign up, Birthday");
    }

    #[test]
    fn test_event_form_rules() {
        let today = day(2026, 10, 16);
        let form = |points: &str, date: NaiveDate| EventForm {
            name: "Christmas".into(),
            date: Some(date),
            points: points.into(),
        };

        assert!(validate_event_form(&form("150", day(2026, 10, 17)), today).is_empty());
        assert!(validate_event_form(&form("150", today), today).is_empty());

        let errors = validate_event_form(&form("0", today), today);
        assert_eq!(errors.get("event"), Some(MSG_EVENT_INCOMPLETE));

        let errors = validate_event_form(&form("10001", today), today);
        assert_eq!(errors.get("points"), Some(MSG_EVENT_POINTS));

        let errors = validate_event_form(&form("150", day(2026, 10, 15)), today);
        assert_eq!(errors.get("date"), Some(MSG_EVENT_PAST));

        let errors = validate_event_form(&EventForm::default(), today);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_event_name_rules() {
        let today = day(2026, 10, 16);
        let named = |name: &str| EventForm {
            name: name.into(),
            date: Some(today),
            points: "100".into(),
        };

        assert!(validate_event_form(&named("Refer & Earn"), today).is_empty());
        assert!(validate_event_form(&named("Store Anniversary"), today).is_empty());

        let errors = validate_event_form(&named("Bad!!<script>"), today);
        assert_eq!(
            errors.get("name"),
            Some("Event name can only contain letters, numbers and spaces")
        );
        let errors = validate_event_form(&named(&"a".repeat(31)), today);
        assert_eq!(errors.get("name"), Some("Event name must be 30 characters or less"));
    }

    #[test]
    fn test_point_settings_rules() {
        let mut settings = PointSettings::default();
        let errors = validate_point_settings(&settings, false);
        assert_eq!(errors.first(), Some(("logo", MSG_LOGO_REQUIRED)));
        assert!(validate_point_settings(&settings, true).is_empty());

        settings.logo = Logo::predefined(0, "");
        settings.point_name = "".into();
        settings.expiry = true;
        settings.tier_status = true;
        settings.tier[2] = Tier::new("Top", 0, Decimal::new(1200, 2));
        let errors = validate_point_settings(&settings, false);
        assert_eq!(errors.get("pointName"), Some("Point name is required"));
        assert!(errors.get("expiriesInDays").is_some());
        assert!(errors.get("tier.2.multiplier").is_some());
        assert!(errors.get("tier.1.multiplier").is_none());
    }

    #[test]
    fn test_zero_threshold_allowed_above_base() {
        let mut settings = PointSettings {
            logo: Logo::predefined(0, ""),
            tier_status: true,
            ..Default::default()
        };
        settings.tier[1] = Tier::new("Gold", 0, Decimal::new(150, 2));
        assert!(validate_point_settings(&settings, false).is_empty());
    }

    #[test]
    fn test_rejoin_only_checked_when_active() {
        let mut rule = RejoinRule::default();
        assert!(validate_rejoin(&rule).is_empty());
        rule.active = true;
        assert_eq!(validate_rejoin(&rule).len(), 2);
        rule.day_of_recall = 90;
        rule.point_rejoin = 50;
        assert!(validate_rejoin(&rule).is_empty());
    }

    #[test]
    fn test_collect_settings_aggregates() {
        let mut settings = CollectSettings::default();
        settings.rule_mut(EarnRuleKind::SignUp).active = true;
        settings.rejoin.active = true;
        let errors = validate_collect_settings(&settings);
        assert_eq!(errors.first().map(|(f, _)| f), Some("earnRules"));
        assert!(errors.get("dayOfRecall").is_some());
    }

    #[test]
    fn test_percentage_discount_ranges() {
        assert!(validate_percentage_discount("500", "10", "").is_empty());
        assert!(validate_percentage_discount("500", "10", "365").is_empty());

        let errors = validate_percentage_discount("0", "101", "366");
        assert_eq!(errors.get("pointValue"), Some(MSG_POINT_VALUE));
        assert_eq!(errors.get("discountAmount"), Some(MSG_DISCOUNT_PERCENT));
        assert_eq!(errors.get("expireCoupon"), Some(MSG_EXPIRY_DAYS));
        assert!(validate_percentage_discount("100001", "1", "").get("pointValue").is_some());
    }

    #[test]
    fn test_other_coupon_forms() {
        assert!(validate_fixed_discount("100", "", Some("500")).is_empty());
        assert!(validate_fixed_discount("100", "", Some("0")).get("maxPoints").is_some());
        assert!(validate_fixed_discount("100", "", None).is_empty());

        assert!(validate_free_shipping("800", "30", Some("50.00")).is_empty());
        assert!(validate_free_shipping("800", "30", Some("0")).get("minimumPurchase").is_some());

        assert!(validate_free_product("200", "", 1).is_empty());
        assert!(validate_free_product("200", "", 0).get("products").is_some());
    }
}
