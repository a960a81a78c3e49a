//! Derives validation schemas from event definitions

use super::check::{ResponseCheck, TimedCheck};
use super::rules::FieldRule;
use super::{CheckTable, ValidationSchema};
use crate::config::FormConfig;
use crate::event::{EventDefinition, ViewMode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Builds a [`ValidationSchema`] for `(event, view)`.
///
/// The builder holds no state that changes between builds, so equal inputs
/// always produce schemas that accept and reject the same payloads.
#[derive(Clone)]
pub struct SchemaBuilder {
    checks: CheckTable,
    trim_text: bool,
    check_timeout: Option<Duration>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            checks: CheckTable::new(),
            trim_text: true,
            check_timeout: None,
        }
    }

    pub fn from_config(config: &FormConfig) -> Self {
        Self {
            checks: CheckTable::new(),
            trim_text: config.trim_text(),
            check_timeout: config.check_timeout(),
        }
    }

    /// Register an asynchronous check for the response field `field`
    pub fn with_check(mut self, field: &str, check: Arc<dyn ResponseCheck>) -> Self {
        self.checks.entry(field.to_string()).or_default().push(check);
        self
    }

    pub fn build(&self, event: Option<&EventDefinition>, view: ViewMode) -> ValidationSchema {
        let Some(event) = event else {
            tracing::debug!(view = view.label(), "event not loaded, using permissive schema");
            return ValidationSchema::permissive(view);
        };

        let rules: Vec<FieldRule> = event
            .booking_fields
            .iter()
            .filter(|field| field.applies_to(view))
            .map(|field| FieldRule::from_field(field, self.trim_text))
            .collect();

        let checks: CheckTable = rules
            .iter()
            .filter_map(|rule| {
                let checks = self.checks.get(&rule.name)?;
                Some((rule.name.clone(), self.bounded(checks)))
            })
            .collect();

        tracing::debug!(
            event = %event.slug,
            view = view.label(),
            rules = rules.len(),
            checked = checks.len(),
            "built booking schema"
        );
        ValidationSchema::with_rules(view, rules, checks)
    }

    fn bounded(&self, checks: &[Arc<dyn ResponseCheck>]) -> Vec<Arc<dyn ResponseCheck>> {
        match self.check_timeout {
            Some(limit) => checks
                .iter()
                .map(|check| Arc::new(TimedCheck::new(check.clone(), limit)) as Arc<dyn ResponseCheck>)
                .collect(),
            None => checks.to_vec(),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("checked_fields", &self.checks.keys().collect::<Vec<_>>())
            .field("trim_text", &self.trim_text)
            .field("check_timeout", &self.check_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{BookingField, FieldKind};
    use crate::schema::{MockResponseCheck, REQUIRED, VALIDATION_TIMEOUT};
    use crate::state::FormValues;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn event() -> EventDefinition {
        EventDefinition::new(
            7,
            "consult",
            vec![
                BookingField::new("name", FieldKind::Name).required(),
                BookingField::new("email", FieldKind::Email).required(),
                BookingField::new("rescheduleReason", FieldKind::Textarea)
                    .required()
                    .only_in(&[ViewMode::Reschedule]),
                BookingField::new("notes", FieldKind::Textarea).only_in(&[ViewMode::New]),
            ],
        )
    }

    fn responses(value: Value) -> FormValues {
        FormValues::with_responses(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_absent_event_gives_permissive_schema() {
        let schema = SchemaBuilder::new().build(None, ViewMode::New);
        assert!(schema.is_permissive());
        assert_eq!(schema.view(), ViewMode::New);
    }

    #[test]
    fn test_rules_follow_field_views() {
        let builder = SchemaBuilder::new();
        let event = event();

        let new = builder.build(Some(&event), ViewMode::New);
        let names: Vec<&str> = new.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "notes"]);

        let reschedule = builder.build(Some(&event), ViewMode::Reschedule);
        let names: Vec<&str> = reschedule.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "rescheduleReason"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = SchemaBuilder::new();
        let event = event();
        let a = builder.build(Some(&event), ViewMode::Reschedule);
        let b = builder.build(Some(&event), ViewMode::Reschedule);
        assert_eq!(a.rules(), b.rules());
    }

    #[tokio::test]
    async fn test_same_inputs_same_verdicts() {
        let builder = SchemaBuilder::new();
        let event = event();
        let payloads = [
            json!({}),
            json!({"name": "Ada", "email": "a@b.com"}),
            json!({"name": "Ada", "email": "bad"}),
            json!({"name": "Ada", "email": "a@b.com", "rescheduleReason": "sick"}),
        ];

        for view in [ViewMode::New, ViewMode::Reschedule] {
            let first = builder.build(Some(&event), view);
            let second = builder.build(Some(&event), view);
            for payload in &payloads {
                let input = responses(payload.clone());
                assert_eq!(
                    first.validate(&input).await,
                    second.validate(&input).await
                );
            }
        }
    }

    #[tokio::test]
    async fn test_reschedule_only_field_required_in_reschedule() {
        let builder = SchemaBuilder::new();
        let event = event();
        let input = responses(json!({"name": "Ada", "email": "a@b.com"}));

        assert!(builder
            .build(Some(&event), ViewMode::New)
            .validate(&input)
            .await
            .is_ok());

        let errors = builder
            .build(Some(&event), ViewMode::Reschedule)
            .validate(&input)
            .await
            .unwrap_err();
        assert_eq!(
            errors.get("responses.rescheduleReason").unwrap().message,
            REQUIRED
        );
    }

    #[tokio::test]
    async fn test_field_outside_view_passes_through_unchecked() {
        let schema = SchemaBuilder::new().build(Some(&event()), ViewMode::Reschedule);
        let input = responses(json!({"name": "Ada", "email": "a@b.com", "rescheduleReason": "x", "notes": 5}));
        let validated = schema.validate(&input).await.unwrap();
        assert_eq!(validated.response("notes"), Some(&json!(5)));
    }

    #[test]
    fn test_checks_only_for_applicable_fields() {
        let mut unused = MockResponseCheck::new();
        unused.expect_check().times(0);

        let schema = SchemaBuilder::new()
            .with_check("notes", Arc::new(unused))
            .build(Some(&event()), ViewMode::Reschedule);
        assert!(format!("{schema:?}").contains("checked_fields: []"));
    }

    #[test]
    fn test_from_config() {
        let config = FormConfig {
            trim_text: Some(false),
            check_timeout_ms: Some(50),
            ..Default::default()
        };
        let schema = SchemaBuilder::from_config(&config).build(Some(&event()), ViewMode::New);
        assert!(schema.rules().iter().all(|rule| !rule.trim));
    }

    struct NeverAnswers;

    #[async_trait]
    impl ResponseCheck for NeverAnswers {
        async fn check(&self, _field: &str, _value: &Value) -> Result<(), String> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_timeout_wraps_checks() {
        let config = FormConfig {
            check_timeout_ms: Some(200),
            ..Default::default()
        };
        let schema = SchemaBuilder::from_config(&config)
            .with_check("email", Arc::new(NeverAnswers))
            .build(Some(&event()), ViewMode::New);

        let errors = schema
            .validate(&responses(json!({"name": "Ada", "email": "a@b.com"})))
            .await
            .unwrap_err();
        assert_eq!(
            errors.get("responses.email").unwrap().message,
            VALIDATION_TIMEOUT
        );
    }
}
