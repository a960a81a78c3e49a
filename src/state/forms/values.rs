//! Form value objects and field paths

use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Path of the reserved whole-form error slot
pub const GLOBAL_ERROR_PATH: &str = "globalError";

const LOCATION_TYPE_PATH: &str = "locationType";
const RESPONSES_PATH: &str = "responses";
const INTEGRATION_PREFIX: &str = "integrations:";

/// Kind of location the attendee picked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LocationType {
    InPerson,
    AttendeeInPerson,
    Link,
    Phone,
    UserPhone,
    AttendeePhone,
    AttendeeAddress,
    SomewhereElse,
    /// A conferencing app, e.g. `integrations:daily`
    Integration(String),
}

impl FromStr for LocationType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            "inPerson" => Self::InPerson,
            "attendeeInPerson" => Self::AttendeeInPerson,
            "link" => Self::Link,
            "phone" => Self::Phone,
            "userPhone" => Self::UserPhone,
            "attendeePhone" => Self::AttendeePhone,
            "attendeeAddress" => Self::AttendeeAddress,
            "somewhereElse" => Self::SomewhereElse,
            other => match other.strip_prefix(INTEGRATION_PREFIX) {
                Some(app) if !app.is_empty() => Self::Integration(app.to_string()),
                _ => return Err(FormError::UnknownLocationType(other.to_string())),
            },
        };
        Ok(kind)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InPerson => "inPerson",
            Self::AttendeeInPerson => "attendeeInPerson",
            Self::Link => "link",
            Self::Phone => "phone",
            Self::UserPhone => "userPhone",
            Self::AttendeePhone => "attendeePhone",
            Self::AttendeeAddress => "attendeeAddress",
            Self::SomewhereElse => "somewhereElse",
            Self::Integration(app) => return write!(f, "{INTEGRATION_PREFIX}{app}"),
        };
        f.write_str(s)
    }
}

impl TryFrom<String> for LocationType {
    type Error = FormError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LocationType> for String {
    fn from(value: LocationType) -> Self {
        value.to_string()
    }
}

/// Address of a value (or error) inside the form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    LocationType,
    /// The whole responses payload
    Responses,
    /// A response field, optionally nested (`responses.name.firstName`)
    Response(Vec<String>),
    /// The reserved form-level error slot
    GlobalError,
    /// Any other top-level key, carried through untouched
    Extra(Vec<String>),
}

impl FieldPath {
    pub fn response(name: &str) -> Self {
        Self::Response(vec![name.to_string()])
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<&str> = s.split('.').collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(FormError::InvalidPath(s.to_string()));
        }
        let rest: Vec<String> = segments[1..].iter().map(|seg| seg.to_string()).collect();

        let path = match segments[0] {
            LOCATION_TYPE_PATH if rest.is_empty() => Self::LocationType,
            GLOBAL_ERROR_PATH if rest.is_empty() => Self::GlobalError,
            RESPONSES_PATH if rest.is_empty() => Self::Responses,
            RESPONSES_PATH => Self::Response(rest),
            LOCATION_TYPE_PATH | GLOBAL_ERROR_PATH => {
                return Err(FormError::InvalidPath(s.to_string()))
            }
            _ => Self::Extra(segments.iter().map(|seg| seg.to_string()).collect()),
        };
        Ok(path)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationType => f.write_str(LOCATION_TYPE_PATH),
            Self::Responses => f.write_str(RESPONSES_PATH),
            Self::Response(rest) => write!(f, "{RESPONSES_PATH}.{}", rest.join(".")),
            Self::GlobalError => f.write_str(GLOBAL_ERROR_PATH),
            Self::Extra(segments) => f.write_str(&segments.join(".")),
        }
    }
}

/// Current values of a booking form.
///
/// `globalError` never appears here: it is an error attachment point, not data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub responses: Option<Map<String, Value>>,
    /// Unknown top-level keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormValues {
    pub fn with_responses(responses: Map<String, Value>) -> Self {
        Self {
            responses: Some(responses),
            ..Default::default()
        }
    }

    /// Drop anything stored under the reserved error key
    pub(crate) fn sanitized(mut self) -> Self {
        self.extra.remove(GLOBAL_ERROR_PATH);
        self
    }

    pub fn response(&self, name: &str) -> Option<&Value> {
        self.responses.as_ref().and_then(|r| r.get(name))
    }

    pub fn get(&self, path: &FieldPath) -> Option<Value> {
        match path {
            FieldPath::LocationType => self
                .location_type
                .as_ref()
                .map(|kind| Value::String(kind.to_string())),
            FieldPath::Responses => self.responses.clone().map(Value::Object),
            FieldPath::Response(rest) => lookup(self.responses.as_ref()?, rest).cloned(),
            FieldPath::GlobalError => None,
            FieldPath::Extra(segments) => lookup(&self.extra, segments).cloned(),
        }
    }

    pub fn set(&mut self, path: &FieldPath, value: Value) -> Result<()> {
        match path {
            FieldPath::LocationType => {
                self.location_type = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s.parse()?),
                    other => return Err(FormError::UnknownLocationType(other.to_string())),
                };
            }
            FieldPath::Responses => {
                self.responses = match value {
                    Value::Null => None,
                    Value::Object(map) => Some(map),
                    _ => {
                        return Err(FormError::NotAnObject {
                            path: path.to_string(),
                            segment: RESPONSES_PATH.to_string(),
                        })
                    }
                };
            }
            FieldPath::Response(rest) => {
                let responses = self.responses.get_or_insert_with(Map::new);
                assign(responses, rest, value, path)?;
            }
            FieldPath::GlobalError => {
                return Err(FormError::ReservedPath(GLOBAL_ERROR_PATH.to_string()))
            }
            FieldPath::Extra(segments) => assign(&mut self.extra, segments, value, path)?,
        }
        Ok(())
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    rest.iter()
        .try_fold(map.get(first)?, |current, seg| current.as_object()?.get(seg))
}

fn assign(
    map: &mut Map<String, Value>,
    segments: &[String],
    value: Value,
    path: &FieldPath,
) -> Result<()> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(FormError::InvalidPath(path.to_string()));
    };
    let mut current = map;
    for seg in parents {
        let entry = current
            .entry(seg.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = entry.as_object_mut().ok_or_else(|| FormError::NotAnObject {
            path: path.to_string(),
            segment: seg.clone(),
        })?;
    }
    current.insert(last.clone(), value);
    Ok(())
}
