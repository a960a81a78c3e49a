//! Error types for form state operations
//!
//! Validation failures are not errors: they are returned as data
//! (`ValidationErrors`) and attached to the form's error state. The
//! variants here cover misuse of the form-state API itself.

use thiserror::Error;

/// Errors raised by form-state mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The path string could not be parsed
    #[error("invalid field path: {0:?}")]
    InvalidPath(String),

    /// The path names the reserved whole-form error slot, which carries no data
    #[error("{0:?} is reserved for form-level errors and cannot hold a value")]
    ReservedPath(String),

    /// A nested write went through a value that is not an object
    #[error("cannot set {path:?}: {segment:?} is not an object")]
    NotAnObject { path: String, segment: String },

    /// The location type value is not a known location kind
    #[error("unknown location type: {0:?}")]
    UnknownLocationType(String),
}

pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_path_display() {
        let err = FormError::ReservedPath("globalError".to_string());
        assert_eq!(
            err.to_string(),
            "\"globalError\" is reserved for form-level errors and cannot hold a value"
        );
    }

    #[test]
    fn test_not_an_object_display() {
        let err = FormError::NotAnObject {
            path: "responses.name.firstName".to_string(),
            segment: "name".to_string(),
        };
        assert!(err.to_string().contains("\"name\" is not an object"));
    }
}
