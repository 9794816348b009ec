//! Controller configuration.
//!
//! Every field has a default, so a config can be built from nothing, from
//! environment variables, or from a YAML file that names only what it changes.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.nature.global";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Access token. When absent the keyring and `NATURE_REMO_TOKEN` are consulted.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub base_url: String,
    pub http_timeout_secs: u64,
    /// Interval between admission checks while the controller is being built.
    pub admission_poll_interval_ms: u64,
    /// Delay between repetitions of a repeated send.
    pub repeat_interval_ms: u64,
    pub default_repeat_count: u32,
    /// Signal name used by the "on" shortcuts.
    pub on_signal_name: String,
    /// Capacity of the completion broadcast channel.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_secs: 30,
            admission_poll_interval_ms: 1000,
            repeat_interval_ms: 1000,
            default_repeat_count: 3,
            on_signal_name: "on".to_string(),
            event_capacity: 64,
        }
    }
}

impl ControllerConfig {
    /// Defaults overridden by `NATURE_REMO_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a YAML file, then apply environment overrides on top.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_yaml_str(&raw)?.with_env_overrides())
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var("NATURE_REMO_TOKEN") {
            self.token = Some(token);
        }
        if let Ok(url) = std::env::var("NATURE_REMO_BASE_URL") {
            self.base_url = url;
        }
        if let Some(secs) = env_parse::<u64>("NATURE_REMO_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = secs;
        }
        if let Some(ms) = env_parse::<u64>("NATURE_REMO_POLL_INTERVAL_MS") {
            self.admission_poll_interval_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("NATURE_REMO_REPEAT_INTERVAL_MS") {
            self.repeat_interval_ms = ms;
        }
        if let Ok(name) = std::env::var("NATURE_REMO_ON_SIGNAL") {
            self.on_signal_name = name;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Err(e) = url::Url::parse(&self.base_url) {
            return Err(Error::configuration_with_context(
                "invalid base url",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("controller_config"),
            ));
        }
        let positive = [
            ("http_timeout_secs", self.http_timeout_secs),
            ("admission_poll_interval_ms", self.admission_poll_interval_ms),
            ("repeat_interval_ms", self.repeat_interval_ms),
            ("default_repeat_count", u64::from(self.default_repeat_count)),
            ("event_capacity", self.event_capacity as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(Error::validation_with_context(
                    "value must be greater than zero",
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("controller_config"),
                ));
            }
        }
        if self.on_signal_name.is_empty() {
            return Err(Error::validation_with_context(
                "on signal name must not be empty",
                ErrorContext::new()
                    .with_field_path("on_signal_name")
                    .with_source("controller_config"),
            ));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn admission_poll_interval(&self) -> Duration {
        Duration::from_millis(self.admission_poll_interval_ms)
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}
