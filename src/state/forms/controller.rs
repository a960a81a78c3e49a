//! Booking form controller
//!
//! Owns the current form values and error state, rebuilds the validation
//! schema when its inputs change, and drives asynchronous validation.
//!
//! Validation is split into three steps so that overlapping calls can be
//! resolved in any order:
//!
//! 1. [`FormController::begin_validation`] snapshots the values and schema
//!    and stamps the call with a sequence token.
//! 2. [`PendingValidation::run`] does the (possibly slow) work.
//! 3. [`FormController::apply_validation`] attaches the outcome, but only
//!    if no newer call has been started since.

use super::errors::{ErrorState, ErrorStore, FieldError};
use super::values::{FieldPath, FormValues};
use crate::config::FormConfig;
use crate::error::Result;
use crate::event::{EventDefinition, ReschedulingContext, ViewMode};
use crate::resolver::{InitialValueBundle, InitialValueResolver, Translator};
use crate::schema::{SchemaBuilder, ValidationOutcome, ValidationSchema};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Where a form is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Uninitialized,
    /// Values equal the last initial values
    Initialized,
    Editing,
    /// A validation call is in flight
    Validating,
}

/// Opaque handle for the region that displays form-level errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorRegionHandle(Uuid);

impl ErrorRegionHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

/// Whether email verification may go ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyEmailGate {
    Proceed,
    /// The event is not loaded; a form-level error has been set
    Blocked,
}

/// A validation call that has been issued but not yet run
#[derive(Debug)]
pub struct PendingValidation {
    token: u64,
    schema: ValidationSchema,
    values: FormValues,
}

impl PendingValidation {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub async fn run(self) -> ValidationReport {
        let outcome = self.schema.validate(&self.values).await;
        ValidationReport {
            token: self.token,
            outcome,
        }
    }
}

/// Result of a finished validation call
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    token: u64,
    pub outcome: ValidationOutcome,
}

impl ValidationReport {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn into_outcome(self) -> ValidationOutcome {
        self.outcome
    }
}

/// Validated state of one booking form
pub struct FormController {
    builder: SchemaBuilder,
    resolver: Arc<dyn InitialValueResolver>,
    translator: Arc<dyn Translator>,
    config: FormConfig,
    event: Option<Arc<EventDefinition>>,
    context: ReschedulingContext,
    schema: ValidationSchema,
    values: FormValues,
    baseline: FormValues,
    errors: ErrorStore,
    key: Option<String>,
    phase: FormPhase,
    latest_token: u64,
    error_region: ErrorRegionHandle,
}

impl FormController {
    pub fn new(resolver: Arc<dyn InitialValueResolver>, translator: Arc<dyn Translator>) -> Self {
        Self::with_config(
            SchemaBuilder::new(),
            resolver,
            translator,
            FormConfig::default(),
        )
    }

    pub fn with_config(
        builder: SchemaBuilder,
        resolver: Arc<dyn InitialValueResolver>,
        translator: Arc<dyn Translator>,
        config: FormConfig,
    ) -> Self {
        let schema = builder.build(None, ViewMode::New);
        Self {
            builder,
            resolver,
            translator,
            config,
            event: None,
            context: ReschedulingContext::default(),
            schema,
            values: FormValues::default(),
            baseline: FormValues::default(),
            errors: ErrorStore::default(),
            key: None,
            phase: FormPhase::Uninitialized,
            latest_token: 0,
            error_region: ErrorRegionHandle::new(),
        }
    }

    /// Bind the first initial values. Returns whether the form was (re)initialised.
    pub async fn initialize(&mut self) -> bool {
        self.sync_initial_values().await
    }

    /// Replace the event definition (`None` while it is still loading)
    pub async fn set_event(&mut self, event: Option<EventDefinition>) -> bool {
        self.event = event.map(Arc::new);
        self.rebuild_schema();
        self.sync_initial_values().await
    }

    pub async fn set_rescheduling_context(&mut self, context: ReschedulingContext) -> bool {
        self.context = context;
        self.rebuild_schema();
        self.sync_initial_values().await
    }

    /// Ask the resolver for initial values and re-baseline if its key changed
    pub async fn sync_initial_values(&mut self) -> bool {
        let bundle = self
            .resolver
            .resolve(self.event.clone(), &self.context)
            .await;
        self.apply_bundle(bundle)
    }

    /// Re-baseline from `bundle` if its key differs from the last one seen.
    ///
    /// This is the only path that replaces the values wholesale. Any
    /// validation still in flight becomes stale.
    pub fn apply_bundle(&mut self, bundle: InitialValueBundle) -> bool {
        if self.key.as_deref() == Some(bundle.key.as_str()) {
            return false;
        }
        tracing::debug!(
            previous = ?self.key,
            key = %bundle.key,
            "reinitializing booking form"
        );

        let values = bundle.initial_values.sanitized();
        self.baseline = values.clone();
        self.values = values;
        self.errors.clear();
        self.key = Some(bundle.key);
        self.latest_token += 1;
        self.phase = FormPhase::Initialized;
        true
    }

    fn rebuild_schema(&mut self) {
        self.schema = self
            .builder
            .build(self.event.as_deref(), self.context.view_mode());
    }

    /// Update one leaf of the form values. Does not validate.
    pub fn set_field_value(&mut self, path: &str, value: Value) -> Result<()> {
        let path: FieldPath = path.parse()?;
        self.values.set(&path, value)?;
        if self.phase == FormPhase::Initialized {
            self.phase = FormPhase::Editing;
        }
        Ok(())
    }

    /// Issue a validation call against the current values
    pub fn begin_validation(&mut self) -> PendingValidation {
        self.latest_token += 1;
        self.phase = FormPhase::Validating;
        tracing::debug!(token = self.latest_token, "validation started");
        PendingValidation {
            token: self.latest_token,
            schema: self.schema.clone(),
            values: self.values.clone(),
        }
    }

    /// Attach a finished call's errors. Returns `false` if the call was superseded.
    pub fn apply_validation(&mut self, report: &ValidationReport) -> bool {
        if report.token != self.latest_token {
            tracing::debug!(
                token = report.token,
                latest = self.latest_token,
                "discarding stale validation result"
            );
            return false;
        }

        match &report.outcome {
            Ok(_) => self.errors.replace_fields(Vec::new()),
            Err(errors) => {
                let translated: Vec<FieldError> = errors
                    .iter()
                    .map(|err| FieldError::new(err.path.clone(), self.translator.translate(&err.message)))
                    .collect();
                self.errors.replace_fields(translated);
            }
        }
        self.phase = FormPhase::Editing;
        true
    }

    /// Validate the current values and attach the outcome
    pub async fn validate(&mut self) -> ValidationOutcome {
        let report = self.begin_validation().run().await;
        self.apply_validation(&report);
        report.into_outcome()
    }

    /// Guard run right before sending a verification email.
    ///
    /// Clears all errors and supersedes any validation still in flight, so a
    /// late result cannot bring field errors back. Without a loaded event,
    /// sets a form-level error and tells the caller not to proceed.
    pub fn before_verify_email(&mut self) -> VerifyEmailGate {
        self.errors.clear();
        self.latest_token += 1;
        if self.phase == FormPhase::Validating {
            self.phase = FormPhase::Editing;
        }

        if self.event.is_none() {
            let message = self.translator.translate(self.config.event_not_loaded_key());
            tracing::warn!("email verification requested before the event loaded");
            self.errors.set(&FieldPath::GlobalError, message);
            return VerifyEmailGate::Blocked;
        }
        VerifyEmailGate::Proceed
    }

    pub fn errors(&self) -> ErrorState {
        self.errors.state()
    }

    pub fn error_store(&self) -> &ErrorStore {
        &self.errors
    }

    pub fn field_error(&self, path: &str) -> Option<&FieldError> {
        let path: FieldPath = path.parse().ok()?;
        self.errors.get(&path)
    }

    pub fn set_error(&mut self, path: &str, message: impl Into<String>) -> Result<()> {
        let path: FieldPath = path.parse()?;
        self.errors.set(&path, message);
        Ok(())
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn response(&self, name: &str) -> Option<&Value> {
        self.values.response(name)
    }

    pub fn form_email(&self) -> Option<&str> {
        self.response("email").and_then(Value::as_str)
    }

    /// Display name, joining first and last name when split
    pub fn form_name(&self) -> Option<String> {
        match self.response("name")? {
            Value::String(name) => Some(name.clone()),
            Value::Object(parts) => {
                let part = |key: &str| parts.get(key).and_then(Value::as_str).unwrap_or_default();
                let full = format!("{} {}", part("firstName"), part("lastName"))
                    .trim()
                    .to_string();
                (!full.is_empty()).then_some(full)
            }
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.baseline
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.context.view_mode()
    }

    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    pub fn event(&self) -> Option<&EventDefinition> {
        self.event.as_deref()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn error_region(&self) -> ErrorRegionHandle {
        self.error_region
    }
}
