//! Per-field validation rules compiled from booking fields

use crate::event::{BookingField, FieldKind};
use serde_json::{Map, Number, Value};

pub const REQUIRED: &str = "error_required_field";
pub const INVALID_EMAIL: &str = "email_validation_error";
pub const INVALID_NUMBER: &str = "invalid_number";
pub const INVALID_PHONE: &str = "invalid_phone_number";
pub const INVALID_OPTION: &str = "invalid_option";
pub const INVALID_URL: &str = "invalid_url";
pub const INVALID_TYPE: &str = "invalid_type";
pub const TOO_SHORT: &str = "too_short";
pub const TOO_LONG: &str = "too_long";

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// Validation rule for one response field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub options: Vec<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub trim: bool,
}

impl FieldRule {
    pub fn from_field(field: &BookingField, trim: bool) -> Self {
        Self {
            name: field.name.clone(),
            kind: field.kind,
            // hidden fields are never required
            required: field.required && !field.hidden,
            options: field.options.iter().map(|o| o.value.clone()).collect(),
            min_length: field.min_length,
            max_length: field.max_length,
            trim,
        }
    }

    /// Check `value` and return its normalised form.
    ///
    /// `Ok(None)` means the field is absent and stays absent. Errors are
    /// translation keys.
    pub fn check(&self, value: Option<&Value>) -> Result<Option<Value>, &'static str> {
        match value {
            Some(value) if !self.is_blank(value) => self.normalize(value).map(Some),
            _ if self.required => Err(REQUIRED),
            _ => Ok(value.cloned()),
        }
    }

    fn normalize(&self, value: &Value) -> Result<Value, &'static str> {
        let normalized = match self.kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Address => self.text(value)?,
            FieldKind::Url => {
                let url = self.text(value)?;
                let s = url.as_str().unwrap_or_default();
                let rest = s
                    .strip_prefix("https://")
                    .or_else(|| s.strip_prefix("http://"))
                    .unwrap_or_default();
                if rest.is_empty() || s.chars().any(char::is_whitespace) {
                    return Err(INVALID_URL);
                }
                url
            }
            FieldKind::Email => {
                let email = self.text(value)?;
                if !is_valid_email(email.as_str().unwrap_or_default()) {
                    return Err(INVALID_EMAIL);
                }
                email
            }
            FieldKind::Phone => {
                let s = value.as_str().ok_or(INVALID_TYPE)?;
                Value::String(normalize_phone(s).ok_or(INVALID_PHONE)?)
            }
            FieldKind::Name => match value {
                Value::String(_) => self.text(value)?,
                Value::Object(parts) => self.name_parts(parts)?,
                _ => return Err(INVALID_TYPE),
            },
            FieldKind::Number => normalize_number(value).ok_or(INVALID_NUMBER)?,
            FieldKind::Boolean | FieldKind::Checkbox => {
                value.as_bool().ok_or(INVALID_TYPE)?;
                value.clone()
            }
            FieldKind::Select | FieldKind::Radio => {
                let s = value.as_str().ok_or(INVALID_TYPE)?;
                self.option(s)?;
                value.clone()
            }
            FieldKind::Multiselect => {
                let items = value.as_array().ok_or(INVALID_TYPE)?;
                for item in items {
                    self.option(item.as_str().ok_or(INVALID_TYPE)?)?;
                }
                value.clone()
            }
            FieldKind::Multiemail => {
                let items = value.as_array().ok_or(INVALID_TYPE)?;
                let mut emails = Vec::with_capacity(items.len());
                for item in items {
                    let email = self.trimmed(item.as_str().ok_or(INVALID_TYPE)?);
                    if !is_valid_email(email) {
                        return Err(INVALID_EMAIL);
                    }
                    emails.push(Value::String(email.to_string()));
                }
                Value::Array(emails)
            }
            FieldKind::RadioInput => {
                let obj = value.as_object().ok_or(INVALID_TYPE)?;
                obj.get("value").and_then(Value::as_str).ok_or(INVALID_TYPE)?;
                match obj.get("optionValue") {
                    None | Some(Value::Null) | Some(Value::String(_)) => {}
                    Some(_) => return Err(INVALID_TYPE),
                }
                value.clone()
            }
        };
        Ok(normalized)
    }

    /// Whether `value` is this kind's "not filled in" value.
    ///
    /// Values of the wrong JSON type are never blank, so they reach the type
    /// check instead of passing as empty.
    pub(crate) fn is_blank(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (_, Value::Null) => true,
            (FieldKind::Multiselect | FieldKind::Multiemail, Value::Array(items)) => {
                items.is_empty()
            }
            (FieldKind::Boolean | FieldKind::Checkbox, Value::Bool(checked)) => !checked,
            (FieldKind::Name, Value::Object(parts)) => is_blank_text(parts.get("firstName")),
            (FieldKind::RadioInput, Value::Object(pick)) => is_blank_text(pick.get("value")),
            (
                FieldKind::Multiselect
                | FieldKind::Multiemail
                | FieldKind::Boolean
                | FieldKind::Checkbox
                | FieldKind::RadioInput,
                _,
            ) => false,
            (_, Value::String(s)) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn trimmed<'a>(&self, s: &'a str) -> &'a str {
        if self.trim {
            s.trim()
        } else {
            s
        }
    }

    fn text(&self, value: &Value) -> Result<Value, &'static str> {
        let s = self.trimmed(value.as_str().ok_or(INVALID_TYPE)?);
        let len = s.chars().count();
        if self.min_length.is_some_and(|min| len < min) {
            return Err(TOO_SHORT);
        }
        if self.max_length.is_some_and(|max| len > max) {
            return Err(TOO_LONG);
        }
        Ok(Value::String(s.to_string()))
    }

    fn name_parts(&self, parts: &Map<String, Value>) -> Result<Value, &'static str> {
        let mut normalized = parts.clone();
        for key in ["firstName", "lastName"] {
            match parts.get(key) {
                None | Some(Value::Null) => {}
                Some(part @ Value::String(_)) => {
                    normalized.insert(key.to_string(), self.text(part)?);
                }
                Some(_) => return Err(INVALID_TYPE),
            }
        }
        Ok(Value::Object(normalized))
    }

    fn option(&self, value: &str) -> Result<(), &'static str> {
        if self.options.is_empty() || self.options.iter().any(|o| o == value) {
            Ok(())
        } else {
            Err(INVALID_OPTION)
        }
    }
}

fn is_blank_text(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

pub(crate) fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn normalize_phone(s: &str) -> Option<String> {
    let compact: String = s
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = compact.strip_prefix('+')?;
    let valid = PHONE_DIGITS.contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    valid.then_some(compact)
}

fn normalize_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return Some(Value::from(n));
            }
            let f = s.parse::<f64>().ok()?;
            Number::from_f64(f).map(Value::Number)
        }
        _ => None,
    }
}
