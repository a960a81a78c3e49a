//! Field and form-level error bookkeeping
//!
//! Errors are attached to field paths. Whole-form errors have no field of
//! their own, so they ride on the reserved `globalError` slot, kept apart
//! from per-field errors in an [`ErrorChannel`].

use super::values::{FieldPath, GLOBAL_ERROR_PATH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An error attached to a single path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The single whole-form error slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorChannel {
    slot: Option<FieldError>,
}

impl ErrorChannel {
    /// Occupy the slot, replacing any previous error
    pub fn set(&mut self, message: impl Into<String>) {
        self.slot = Some(FieldError::new(GLOBAL_ERROR_PATH, message));
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn get(&self) -> Option<&FieldError> {
        self.slot.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }
}

/// Read-only view over the whole-form error
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorState {
    pub has_form_errors: bool,
    pub form_errors: Option<FieldError>,
}

/// All errors currently attached to a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorStore {
    fields: BTreeMap<String, FieldError>,
    global: ErrorChannel,
}

impl ErrorStore {
    /// Attach `message` to `path`, routing `globalError` to the form-level slot
    pub fn set(&mut self, path: &FieldPath, message: impl Into<String>) {
        match path {
            FieldPath::GlobalError => self.global.set(message),
            _ => {
                let key = path.to_string();
                self.fields
                    .insert(key.clone(), FieldError::new(key, message));
            }
        }
    }

    /// Replace every per-field error, leaving the form-level slot alone
    pub fn replace_fields(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        self.fields = errors
            .into_iter()
            .map(|err| (err.path.clone(), err))
            .collect();
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldError> {
        match path {
            FieldPath::GlobalError => self.global.get(),
            _ => self.fields.get(&path.to_string()),
        }
    }

    pub fn field_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.fields.values()
    }

    pub fn global(&self) -> &ErrorChannel {
        &self.global
    }

    /// Clear per-field errors and the form-level slot
    pub fn clear(&mut self) {
        self.fields.clear();
        self.global.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && !self.global.is_occupied()
    }

    pub fn state(&self) -> ErrorState {
        ErrorState {
            has_form_errors: self.global.is_occupied(),
            form_errors: self.global.get().cloned(),
        }
    }
}
