//! Ways-to-earn ("collect") settings

use serde::{Deserialize, Deserializer, Serialize};

use super::event::Event;

/// One on/off earn rule with its point value
///
/// When `active` is false the point value is kept but not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EarnRule {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub point: u32,
}

impl EarnRule {
    pub fn new(active: bool, point: u32) -> Self {
        Self { active, point }
    }
}

/// Which basic earn rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EarnRuleKind {
    SignUp,
    EveryPurchase,
    Birthday,
    ReferAndEarn,
    ProfileCompletion,
    Newsletter,
}

impl EarnRuleKind {
    pub const ALL: [EarnRuleKind; 6] = [
        Self::SignUp,
        Self::EveryPurchase,
        Self::Birthday,
        Self::ReferAndEarn,
        Self::ProfileCompletion,
        Self::Newsletter,
    ];

    /// Label used in the aggregated validation message
    pub fn label(&self) -> &'static str {
        match self {
            Self::SignUp => "Sign up",
            Self::EveryPurchase => "Every purchase",
            Self::Birthday => "Birthday",
            Self::ReferAndEarn => "Refer & Earn",
            Self::ProfileCompletion => "Profile Completion",
            Self::Newsletter => "Subscribing to newsletter",
        }
    }

    /// Form field key
    pub fn field(&self) -> &'static str {
        match self {
            Self::SignUp => "signUp",
            Self::EveryPurchase => "everyPurchase",
            Self::Birthday => "birthday",
            Self::ReferAndEarn => "referEarn",
            Self::ProfileCompletion => "profileCompletion",
            Self::Newsletter => "newsletter",
        }
    }
}

/// `basic` block of the collect document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasicEarnRules {
    #[serde(default)]
    pub signup: EarnRule,
    #[serde(default)]
    pub spent: EarnRule,
    #[serde(default)]
    pub birthday: EarnRule,
    #[serde(rename = "subucribing", default)]
    pub newsletter: EarnRule,
    #[serde(rename = "profileComplition", default)]
    pub profile_completion: EarnRule,
}

/// `event` block of the collect document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventSettings {
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_events")]
    pub events: Vec<Event>,
}

/// `rejoin` block of the collect document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejoinRule {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub day_of_recall: u32,
    #[serde(default)]
    pub point_rejoin: u32,
}

/// Ways-to-earn configuration for one (store, channel)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectSettings {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub basic: BasicEarnRules,
    #[serde(default)]
    pub refer_and_earn: EarnRule,
    #[serde(default)]
    pub event: EventSettings,
    #[serde(default)]
    pub rejoin: RejoinRule,
}

impl CollectSettings {
    pub fn rule(&self, kind: EarnRuleKind) -> EarnRule {
        match kind {
            EarnRuleKind::SignUp => self.basic.signup,
            EarnRuleKind::EveryPurchase => self.basic.spent,
            EarnRuleKind::Birthday => self.basic.birthday,
            EarnRuleKind::ReferAndEarn => self.refer_and_earn,
            EarnRuleKind::ProfileCompletion => self.basic.profile_completion,
            EarnRuleKind::Newsletter => self.basic.newsletter,
        }
    }

    pub fn rule_mut(&mut self, kind: EarnRuleKind) -> &mut EarnRule {
        match kind {
            EarnRuleKind::SignUp => &mut self.basic.signup,
            EarnRuleKind::EveryPurchase => &mut self.basic.spent,
            EarnRuleKind::Birthday => &mut self.basic.birthday,
            EarnRuleKind::ReferAndEarn => &mut self.refer_and_earn,
            EarnRuleKind::ProfileCompletion => &mut self.basic.profile_completion,
            EarnRuleKind::Newsletter => &mut self.basic.newsletter,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Labels of the basic rules currently switched on
    pub fn enabled_rules(&self) -> Vec<&'static str> {
        EarnRuleKind::ALL
            .iter()
            .filter(|kind| self.rule(**kind).active)
            .map(|kind| kind.label())
            .collect()
    }
}

/// Body of the collect save endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectSettingsPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<&'a str>,
    pub basic: &'a BasicEarnRules,
    pub refer_and_earn: &'a EarnRule,
    pub event: &'a EventSettings,
    pub rejoin: &'a RejoinRule,
}

impl<'a> CollectSettingsPayload<'a> {
    pub fn new(settings: &'a CollectSettings) -> Self {
        Self {
            store_id: None,
            channel_id: None,
            basic: &settings.basic,
            refer_and_earn: &settings.refer_and_earn,
            event: &settings.event,
            rejoin: &settings.rejoin,
        }
    }

    pub fn scoped(mut self, store_id: &'a str, channel_id: &'a str) -> Self {
        self.store_id = Some(store_id);
        self.channel_id = Some(channel_id);
        self
    }
}

/// Drop malformed events instead of failing the whole document
fn lenient_events<'de, D>(deserializer: D) -> Result<Vec<Event>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Event>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed event in collect settings");
                None
            }
        })
        .collect())
}
