//! Event definitions and rescheduling context
//!
//! These are inputs supplied by the host. The form core reads them and never
//! mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which flow the booking form is filled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    New,
    Reschedule,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reschedule => "reschedule",
        }
    }
}

/// Kind of value a booking field expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Name,
    Email,
    Phone,
    Address,
    Text,
    Textarea,
    Number,
    Boolean,
    Checkbox,
    Select,
    Radio,
    Multiselect,
    Multiemail,
    Url,
    /// Location picker: `{ value, optionValue? }`
    RadioInput,
}

/// A selectable option for select-like fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// A single bookable field of an event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Views this field applies to; `None` means every view
    pub views: Option<Vec<ViewMode>>,
}

impl BookingField {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: String::new(),
            required: false,
            hidden: false,
            options: Vec::new(),
            min_length: None,
            max_length: None,
            views: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_options(mut self, values: &[&str]) -> Self {
        self.options = values
            .iter()
            .map(|v| FieldOption {
                value: v.to_string(),
                label: v.to_string(),
            })
            .collect();
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn only_in(mut self, views: &[ViewMode]) -> Self {
        self.views = Some(views.to_vec());
        self
    }

    /// Whether the field takes part in validation for `view`
    pub fn applies_to(&self, view: ViewMode) -> bool {
        self.views
            .as_ref()
            .map_or(true, |views| views.contains(&view))
    }
}

/// Description of an event type's bookable field set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub booking_fields: Vec<BookingField>,
}

impl EventDefinition {
    pub fn new(id: u64, slug: &str, booking_fields: Vec<BookingField>) -> Self {
        Self {
            id,
            slug: slug.to_string(),
            title: String::new(),
            booking_fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&BookingField> {
        self.booking_fields.iter().find(|f| f.name == name)
    }
}

/// An existing booking being rescheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub uid: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub responses: Map<String, Value>,
}

/// Reschedule identifiers read from the host's store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReschedulingContext {
    pub reschedule_uid: Option<String>,
    pub booking: Option<BookingRecord>,
}

impl ReschedulingContext {
    pub fn rescheduling(uid: &str, booking: BookingRecord) -> Self {
        Self {
            reschedule_uid: Some(uid.to_string()),
            booking: Some(booking),
        }
    }

    /// `Reschedule` only when both the identifier and the booking are present
    pub fn view_mode(&self) -> ViewMode {
        match (&self.reschedule_uid, &self.booking) {
            (Some(uid), Some(_)) if !uid.is_empty() => ViewMode::Reschedule,
            _ => ViewMode::New,
        }
    }
}
