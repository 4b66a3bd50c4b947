//! List reconciliation
//!
//! Views may show a filtered subset of the authoritative list, so every
//! mutation first maps the view position back to the authoritative index:
//! server id first, then structural match, then position.

use chrono::NaiveDate;
use shared::form::{IntegerPolicy, sanitize_integer, sanitize_name};
use shared::models::{Event, EventForm, EventOccasion, RedeemCoupon};
use shared::validation::{FieldErrors, validate_event_form};
use std::str::FromStr;

use crate::error::ConsoleError;

/// An item that may or may not carry a server id yet
pub trait Reconcilable {
    fn server_id(&self) -> Option<&str>;

    fn matches_structurally(&self, other: &Self) -> bool;
}

impl Reconcilable for Event {
    fn server_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn matches_structurally(&self, other: &Self) -> bool {
        self.same_shape(other)
    }
}

impl Reconcilable for RedeemCoupon {
    fn server_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn matches_structurally(&self, other: &Self) -> bool {
        self.same_shape(other)
    }
}

/// Authoritative index of `view[view_index]` within `items`
pub fn resolve_index<T: Reconcilable>(items: &[T], view: &[T], view_index: usize) -> Option<usize> {
    let target = view.get(view_index)?;

    if let Some(id) = target.server_id()
        && let Some(index) = items.iter().position(|item| item.server_id() == Some(id))
    {
        return Some(index);
    }

    if let Some(index) = items.iter().position(|item| item.matches_structurally(target)) {
        return Some(index);
    }

    (view_index < items.len()).then_some(view_index)
}

/// An event open for editing
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub index: usize,
    pub form: EventForm,
}

/// Ordered event collection with single-row editing
#[derive(Debug, Clone, Default)]
pub struct EventList {
    items: Vec<Event>,
    editing: Option<EditSession>,
    add_form: EventForm,
}

impl EventList {
    pub fn new(items: Vec<Event>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[Event] {
        &self.items
    }

    /// Mutable access for guard discard
    pub fn items_mut(&mut self) -> &mut Vec<Event> {
        &mut self.items
    }

    /// Adopt a fresh list from the backend; any open edit is dropped
    pub fn replace(&mut self, items: Vec<Event>) {
        self.items = items;
        self.editing = None;
    }

    pub fn add_form(&self) -> &EventForm {
        &self.add_form
    }

    pub fn add_form_mut(&mut self) -> &mut EventForm {
        &mut self.add_form
    }

    /// Picker labels are kept as shown; typed names are sanitized
    pub fn set_add_name(&mut self, raw: &str) {
        self.add_form.name = if EventOccasion::is_predefined_label(raw) {
            raw.to_string()
        } else {
            sanitize_name(raw)
        };
    }

    pub fn set_add_points(&mut self, raw: &str) {
        self.add_form.points = sanitize_integer(raw, IntegerPolicy::GENERAL);
    }

    pub fn set_add_date(&mut self, date: Option<NaiveDate>) {
        self.add_form.date = date;
    }

    /// Validate the add form and append the event
    ///
    /// The event goes to the end of the authoritative list, never into a
    /// filtered view. The form is cleared on success and kept on failure.
    pub fn add(&mut self, today: NaiveDate) -> Result<&Event, FieldErrors> {
        let (name, date, point) = parse_form(&self.add_form, today)?;
        self.items.push(Event::scheduled(name, date, point, today));
        self.add_form.clear();
        tracing::debug!(count = self.items.len(), "Event added");
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Open `view[view_index]` for editing, closing any other open edit
    pub fn start_edit(&mut self, view_index: usize, view: &[Event]) -> Option<usize> {
        let index = resolve_index(&self.items, view, view_index)?;
        self.editing = Some(EditSession {
            index,
            form: EventForm::from_event(&self.items[index]),
        });
        Some(index)
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut EventForm> {
        self.editing.as_mut().map(|session| &mut session.form)
    }

    /// Apply the open edit
    ///
    /// Id, status and processing info are kept; `is_immediate` follows the
    /// new date. Returns the edited index, or `None` when nothing was open.
    pub fn commit_edit(&mut self, today: NaiveDate) -> Result<Option<usize>, FieldErrors> {
        let Some(session) = &self.editing else {
            return Ok(None);
        };
        let (name, date, point) = parse_form(&session.form, today)?;
        let index = session.index;

        let Some(event) = self.items.get_mut(index) else {
            self.editing = None;
            return Ok(None);
        };
        let updated = Event::scheduled(name, date, point, today);
        event.name = updated.name;
        event.event_date = updated.event_date;
        event.point = updated.point;
        event.is_immediate = updated.is_immediate;

        self.editing = None;
        Ok(Some(index))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Remove `view[view_index]` from the authoritative list
    pub fn delete(&mut self, view_index: usize, view: &[Event]) -> Option<Event> {
        let index = resolve_index(&self.items, view, view_index)?;
        let removed = self.items.remove(index);

        self.editing = match self.editing.take() {
            Some(session) if session.index == index => None,
            Some(mut session) if session.index > index => {
                session.index -= 1;
                Some(session)
            }
            other => other,
        };
        Some(removed)
    }

    /// Case-insensitive name search; an empty query shows everything
    pub fn filtered(&self, query: &str) -> Vec<Event> {
        let query = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|event| query.is_empty() || event.name.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    pub fn resolve_index(&self, view: &[Event], view_index: usize) -> Option<usize> {
        resolve_index(&self.items, view, view_index)
    }
}

fn parse_form(form: &EventForm, today: NaiveDate) -> Result<(String, NaiveDate, u32), FieldErrors> {
    let errors = validate_event_form(form, today);
    let (Some(date), Ok(point)) = (form.date, form.points.trim().parse::<u32>()) else {
        return Err(errors);
    };
    errors.into_result()?;
    Ok((form.name.trim().to_string(), date, point))
}

/// Which coupons a bulk delete targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkSelection {
    All,
    Ids(Vec<String>),
}

impl BulkSelection {
    /// Server ids to delete, in list order
    ///
    /// Unsaved coupons and ids not present in `coupons` are skipped.
    pub fn resolve(&self, coupons: &[RedeemCoupon]) -> Vec<String> {
        coupons
            .iter()
            .filter_map(|coupon| coupon.server_id())
            .filter(|id| match self {
                Self::All => true,
                Self::Ids(ids) => ids.iter().any(|selected| selected.as_str() == *id),
            })
            .map(str::to_string)
            .collect()
    }
}

/// How a partially failed bulk delete is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkDeletePolicy {
    /// Drop what was deleted, report what was not
    #[default]
    BestEffort,
    /// Any failure fails the whole operation; local state waits for a refresh
    AllOrNothing,
}

impl FromStr for BulkDeletePolicy {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(Self::BestEffort),
            "all_or_nothing" => Ok(Self::AllOrNothing),
            other => Err(ConsoleError::Config(format!(
                "unknown bulk delete policy: {other}"
            ))),
        }
    }
}
