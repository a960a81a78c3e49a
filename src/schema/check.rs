//! Asynchronous response checks
//!
//! Some rules can't be decided locally (is this email already booked, does
//! this phone number exist). They are supplied by the host as
//! [`ResponseCheck`]s and awaited during validation.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Translation key reported when a check runs past its deadline
pub const VALIDATION_TIMEOUT: &str = "validation_timeout";

/// An externally supplied rule for one response field
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCheck: Send + Sync {
    /// Check an already well-formed value. `Err` carries a translation key.
    async fn check(&self, field: &str, value: &Value) -> Result<(), String>;
}

/// Bounds a check's running time
pub struct TimedCheck {
    inner: Arc<dyn ResponseCheck>,
    limit: Duration,
}

impl TimedCheck {
    pub fn new(inner: Arc<dyn ResponseCheck>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl ResponseCheck for TimedCheck {
    async fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        match tokio::time::timeout(self.limit, self.inner.check(field, value)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(field, limit_ms = self.limit.as_millis() as u64, "response check timed out");
                Err(VALIDATION_TIMEOUT.to_string())
            }
        }
    }
}
