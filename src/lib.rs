//! Booker form - validated state for event booking forms
//!
//! The set of fields on a booking form comes from the event being booked,
//! and which of them must be filled in depends on whether the booking is
//! new or being rescheduled. This crate builds a validation schema per
//! event and view, drives asynchronous validation against it, and keeps
//! per-field and form-level errors in one place.
//!
//! Rendering, translation tables, computing initial values and submitting
//! the booking are left to the host, which plugs them in through the
//! traits in [`resolver`] and [`schema::ResponseCheck`].

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod resolver;
pub mod schema;
pub mod state;

pub use config::FormConfig;
pub use error::FormError;
pub use event::{BookingField, EventDefinition, FieldKind, ReschedulingContext, ViewMode};
pub use resolver::{InitialValueBundle, InitialValueResolver, KeyTranslator, Translator};
pub use schema::{
    ResponseCheck, SchemaBuilder, ValidationErrors, ValidationOutcome, ValidationSchema,
};
pub use state::{
    ErrorState, FieldError, FieldPath, FormController, FormPhase, FormValues, VerifyEmailGate,
};
