//! Trait abstractions for the form's external collaborators

use crate::event::{EventDefinition, ReschedulingContext};
use crate::state::FormValues;
use async_trait::async_trait;
use std::sync::Arc;

/// Initial values plus the key that identifies them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitialValueBundle {
    pub initial_values: FormValues,
    /// Changes whenever `initial_values` must replace the form state wholesale
    pub key: String,
}

impl InitialValueBundle {
    pub fn new(initial_values: FormValues, key: impl Into<String>) -> Self {
        Self {
            initial_values,
            key: key.into(),
        }
    }
}

/// Computes starting values, e.g. from the booking being rescheduled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InitialValueResolver: Send + Sync {
    async fn resolve(
        &self,
        event: Option<Arc<EventDefinition>>,
        context: &ReschedulingContext,
    ) -> InitialValueBundle;
}

/// Localisation lookup
#[cfg_attr(test, mockall::automock)]
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

/// Translator that returns keys unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}
