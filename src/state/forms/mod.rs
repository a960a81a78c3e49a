//! Form domain layer
//!
//! Values, paths, errors and the controller that ties them to a
//! validation schema.

mod controller;
mod errors;
mod values;

pub use controller::{
    ErrorRegionHandle, FormController, FormPhase, PendingValidation, ValidationReport,
    VerifyEmailGate,
};
pub use errors::{ErrorChannel, ErrorState, ErrorStore, FieldError};
pub use values::{FieldPath, FormValues, LocationType, GLOBAL_ERROR_PATH};
