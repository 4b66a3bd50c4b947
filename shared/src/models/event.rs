//! Scheduled point-award events

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event lifecycle status
///
/// Only `Scheduled` is ever assigned client-side; the backend moves events
/// through `Processing` to `Completed` asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Processing,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    /// Display label used by the events table badge
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
        }
    }
}

// Unknown or missing statuses read as scheduled.
impl From<String> for EventStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            _ => Self::Scheduled,
        }
    }
}

impl From<EventStatus> for String {
    fn from(value: EventStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background job progress reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingInfo {
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(rename = "jobID", default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub processed_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub total_customers: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessingInfo {
    /// Processed share in percent, `None` before the job has targets
    pub fn progress_percent(&self) -> Option<u8> {
        if self.total_customers == 0 {
            return None;
        }
        let done = self
            .processed_count
            .saturating_add(self.failed_count)
            .min(self.total_customers);
        Some(((u64::from(done) * 100) / u64::from(self.total_customers)) as u8)
    }
}

/// Occasions offered in the event name picker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventOccasion {
    Birthday,
    ReferAndEarn,
    ProfileCompletion,
    Newsletter,
    Easter,
    Christmas,
    NewYear,
    Diwali,
    Holi,
    Thanksgiving,
    Custom(String),
}

impl EventOccasion {
    pub const PREDEFINED: [EventOccasion; 10] = [
        Self::Birthday,
        Self::ReferAndEarn,
        Self::ProfileCompletion,
        Self::Newsletter,
        Self::Easter,
        Self::Christmas,
        Self::NewYear,
        Self::Diwali,
        Self::Holi,
        Self::Thanksgiving,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::Birthday => "Birthday",
            Self::ReferAndEarn => "Refer & Earn",
            Self::ProfileCompletion => "Profile Completion",
            Self::Newsletter => "Subscribing to newsletter",
            Self::Easter => "Easter",
            Self::Christmas => "Christmas",
            Self::NewYear => "New Year",
            Self::Diwali => "Diwali",
            Self::Holi => "Holi",
            Self::Thanksgiving => "Thanksgiving",
            Self::Custom(name) => name,
        }
    }

    /// One of the picker's fixed labels, stored exactly as shown
    pub fn is_predefined_label(label: &str) -> bool {
        Self::PREDEFINED.iter().any(|o| o.label() == label)
    }

    /// Match a label against the predefined list, falling back to free text
    pub fn from_label(label: &str) -> Self {
        Self::PREDEFINED
            .iter()
            .find(|o| o.label() == label)
            .cloned()
            .unwrap_or_else(|| Self::Custom(label.to_string()))
    }
}

/// Scheduled point-award occasion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default = "default_event_kind")]
    pub kind: String,
    pub event_date: DateTime<Utc>,
    pub point: u32,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub processing_info: ProcessingInfo,
    #[serde(default)]
    pub is_immediate: bool,
}

fn default_event_kind() -> String {
    "default".to_string()
}

impl Event {
    /// New client-side event, not yet persisted
    ///
    /// `is_immediate` is set when the event falls on `today`.
    pub fn scheduled(name: impl Into<String>, date: NaiveDate, point: u32, today: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: default_event_kind(),
            event_date: date.and_time(NaiveTime::MIN).and_utc(),
            point,
            status: EventStatus::Scheduled,
            processing_info: ProcessingInfo::default(),
            is_immediate: date == today,
        }
    }

    /// Calendar day of the event
    pub fn date(&self) -> NaiveDate {
        self.event_date.date_naive()
    }

    /// Same name, date and amount
    pub fn same_shape(&self, other: &Event) -> bool {
        self.name == other.name && self.event_date == other.event_date && self.point == other.point
    }

    /// Still waiting for the backend to pick it up
    pub fn is_upcoming(&self) -> bool {
        self.status == EventStatus::Scheduled
    }
}

/// Raw add/edit form state for an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub points: String,
}

impl EventForm {
    /// Pre-fill the form from an existing event
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            date: Some(event.date()),
            points: event.point.to_string(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
