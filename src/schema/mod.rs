//! Validation schemas for the booking `responses` payload
//!
//! A schema is derived from an event definition and a view mode by
//! [`SchemaBuilder`]. Validation is asynchronous because response checks
//! may need to ask the outside world.

mod builder;
mod check;
mod rules;

pub use builder::SchemaBuilder;
pub use check::{ResponseCheck, TimedCheck, VALIDATION_TIMEOUT};
pub use rules::{
    FieldRule, INVALID_EMAIL, INVALID_NUMBER, INVALID_OPTION, INVALID_PHONE, INVALID_TYPE,
    INVALID_URL, REQUIRED, TOO_LONG, TOO_SHORT,
};

#[cfg(test)]
pub use check::MockResponseCheck;

use crate::event::ViewMode;
use crate::state::{FieldError, FieldPath, FormValues};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub(crate) type CheckTable = BTreeMap<String, Vec<Arc<dyn ResponseCheck>>>;

/// Field-level failures from one validation run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.errors.iter().find(|err| err.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Validated form values, or the field errors that prevented validation
pub type ValidationOutcome = Result<FormValues, ValidationErrors>;

/// Shape of the `responses` payload for one event and view.
///
/// Keys not covered by a rule are carried through unchecked.
#[derive(Clone)]
pub struct ValidationSchema {
    view: ViewMode,
    rules: Option<Arc<[FieldRule]>>,
    checks: Arc<CheckTable>,
}

impl ValidationSchema {
    /// Placeholder used until the event definition has loaded; accepts anything
    pub fn permissive(view: ViewMode) -> Self {
        Self {
            view,
            rules: None,
            checks: Arc::new(CheckTable::new()),
        }
    }

    pub(crate) fn with_rules(view: ViewMode, rules: Vec<FieldRule>, checks: CheckTable) -> Self {
        Self {
            view,
            rules: Some(rules.into()),
            checks: Arc::new(checks),
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn is_permissive(&self) -> bool {
        self.rules.is_none()
    }

    pub fn rules(&self) -> &[FieldRule] {
        self.rules.as_deref().unwrap_or_default()
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules().iter().find(|rule| rule.name == name)
    }

    /// Validate `values.responses`, returning the normalised values on success.
    ///
    /// A `null` payload is checked as an empty one. Failures never escape as
    /// panics or errors; they come back as [`ValidationErrors`].
    pub async fn validate(&self, values: &FormValues) -> ValidationOutcome {
        let Some(rules) = &self.rules else {
            return Ok(values.clone());
        };
        tracing::debug!(view = self.view.label(), rules = rules.len(), "validating responses");

        let input = values.responses.clone().unwrap_or_default();
        let mut output = input.clone();
        let mut errors = Vec::new();
        let mut pending = Vec::new();

        for rule in rules.iter() {
            match rule.check(input.get(&rule.name)) {
                Ok(Some(value)) => {
                    if !rule.is_blank(&value) && self.checks.contains_key(&rule.name) {
                        pending.push((rule.name.as_str(), value.clone()));
                    }
                    output.insert(rule.name.clone(), value);
                }
                Ok(None) => {}
                Err(key) => errors.push(response_error(&rule.name, key)),
            }
        }

        for (name, value) in pending {
            for check in self.checks.get(name).into_iter().flatten() {
                if let Err(key) = check.check(name, &value).await {
                    errors.push(response_error(name, key));
                    break;
                }
            }
        }

        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "responses rejected");
            return Err(ValidationErrors::new(errors));
        }

        let mut validated = values.clone();
        validated.responses = Some(output);
        Ok(validated)
    }
}

fn response_error(name: &str, message: impl Into<String>) -> FieldError {
    FieldError::new(FieldPath::response(name).to_string(), message)
}

impl fmt::Debug for ValidationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationSchema")
            .field("view", &self.view)
            .field("rules", &self.rules)
            .field("checked_fields", &self.checks.keys().collect::<Vec<_>>())
            .finish()
    }
}
