//! Point currency & tier models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point names offered in the name picker
pub const PREDEFINED_POINT_NAMES: [&str; 11] = [
    "Points",
    "Loyalty points",
    "Diamonds",
    "Gems",
    "Credits",
    "Stars",
    "Coins",
    "Tokens",
    "Bonus Points",
    "Reward points",
    "Hearts",
];

/// Built-in logo assets, relative to `{base_path}/images/`
pub const PREDEFINED_LOGOS: [&str; 6] = [
    "point-icon1.svg",
    "point-icon2.svg",
    "point-icon3.svg",
    "point-icon4.svg",
    "point-icon5.svg",
    "point-icon6.svg",
];

/// Default point currency name
pub const DEFAULT_POINT_NAME: &str = "Points";

/// Point logo reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub src: String,
    #[serde(default)]
    pub name: String,
}

impl Logo {
    /// Logo for one of the [`PREDEFINED_LOGOS`]
    pub fn predefined(index: usize, base_path: &str) -> Option<Self> {
        let file = PREDEFINED_LOGOS.get(index)?;
        Some(Self {
            id: Some(index as u32),
            src: format!("{}/images/{}", base_path.trim_end_matches('/'), file),
            name: (*file).to_string(),
        })
    }
}

/// Merchant-defined point name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPointName {
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

/// Reward tier
///
/// `multiplier` is kept at two-decimal precision; tier 0 is the base tier and
/// is always `point_required = 0`, `multiplier = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    #[serde(default)]
    pub tier_name: String,
    #[serde(default)]
    pub point_required: u32,
    #[serde(default = "Tier::base_multiplier", with = "rust_decimal::serde::float")]
    pub multiplier: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_color: Option<String>,
}

impl Tier {
    /// Number of tiers the program always shows
    pub const COUNT: usize = 3;

    pub fn new(name: impl Into<String>, point_required: u32, multiplier: Decimal) -> Self {
        Self {
            tier_name: name.into(),
            point_required,
            multiplier,
            badge_color: None,
        }
    }

    fn base_multiplier() -> Decimal {
        Decimal::ONE
    }

    /// The three canonical default tiers
    pub fn canonical_defaults() -> Vec<Tier> {
        vec![
            Tier::new("Silver", 0, Decimal::ONE),
            Tier::new("Gold", 1000, Decimal::new(150, 2)),
            Tier::new("Platinum", 5000, Decimal::new(200, 2)),
        ]
    }

    /// Force the base tier back to threshold 0 and multiplier 1
    pub fn lock_base(tiers: &mut [Tier]) {
        if let Some(base) = tiers.first_mut() {
            base.point_required = 0;
            base.multiplier = Decimal::ONE;
        }
    }

    /// Normalize a server-provided tier list
    ///
    /// Missing rows are filled from the canonical defaults, extra rows are kept,
    /// and the base tier is locked.
    pub fn normalize(mut tiers: Vec<Tier>) -> Vec<Tier> {
        let defaults = Self::canonical_defaults();
        if tiers.len() < Self::COUNT {
            tiers.extend(defaults.into_iter().skip(tiers.len()));
        }
        Self::lock_base(&mut tiers);
        tiers
    }
}

/// Point currency configuration for one (store, channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSettings {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_point_name")]
    pub point_name: String,
    #[serde(default)]
    pub custom_point_name: Vec<CustomPointName>,
    #[serde(default)]
    pub expiry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiries_in_days: Option<u32>,
    #[serde(default)]
    pub tier_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_logo: Option<Logo>,
    #[serde(default = "Tier::canonical_defaults")]
    pub tier: Vec<Tier>,
}

fn default_point_name() -> String {
    DEFAULT_POINT_NAME.to_string()
}

impl Default for PointSettings {
    fn default() -> Self {
        Self {
            id: None,
            point_name: default_point_name(),
            custom_point_name: Vec::new(),
            expiry: false,
            expiries_in_days: None,
            tier_status: false,
            logo: None,
            custom_logo: None,
            tier: Tier::canonical_defaults(),
        }
    }
}

impl PointSettings {
    /// A server id has been observed; saves use update semantics
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Apply fallbacks to a document fetched from the backend
    pub fn normalized(mut self) -> Self {
        if self.point_name.trim().is_empty() {
            self.point_name = default_point_name();
        }
        self.tier = Tier::normalize(std::mem::take(&mut self.tier));
        if !self.expiry {
            self.expiries_in_days = None;
        }
        self
    }

    /// The logo that will be shown, custom upload first
    pub fn effective_logo(&self) -> Option<&Logo> {
        self.custom_logo.as_ref().or(self.logo.as_ref())
    }
}
