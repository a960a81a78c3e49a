//! Configuration handling for booking forms

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Translation key used when email verification is attempted before the event loaded
pub const DEFAULT_EVENT_NOT_LOADED_KEY: &str = "error_booking_event";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "booker_form=info";

/// User configuration for booking forms
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Translation key for the "event not yet loaded" form error
    pub event_not_loaded_key: Option<String>,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: Option<String>,
    /// Upper bound for each asynchronous response check, in milliseconds
    pub check_timeout_ms: Option<u64>,
    /// Trim surrounding whitespace from text responses
    pub trim_text: Option<bool>,
}

impl FormConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "booker", "booker-form")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: FormConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn event_not_loaded_key(&self) -> &str {
        self.event_not_loaded_key
            .as_deref()
            .unwrap_or(DEFAULT_EVENT_NOT_LOADED_KEY)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }

    pub fn trim_text(&self) -> bool {
        self.trim_text.unwrap_or(true)
    }
}
