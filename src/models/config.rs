//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Longest endpoint name the control plane accepts.
pub const MAX_ENDPOINT_NAME_LEN: usize = 40;

/// Characters appended to the prefix: `-<13 digit millis>-<6 hex>`.
pub const ENDPOINT_NAME_SUFFIX_LEN: usize = 1 + 13 + 1 + 6;

/// Root provisioner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Endpoint creation settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Completion polling settings
    #[serde(default)]
    pub poller: PollerConfig,
}

impl ProvisionerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override values from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override values from a key lookup.
    ///
    /// Recognised keys: `ENDPOINT_NAME_PREFIX`, `DESIRED_INFERENCE_UNITS`,
    /// `POLL_INTERVAL_SECS`, `POLL_TIMEOUT_SECS`, `FAIL_OPEN_ON_POLL_ERROR`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(prefix) = lookup("ENDPOINT_NAME_PREFIX") {
            self.endpoint.name_prefix = prefix;
        }
        if let Some(units) = lookup("DESIRED_INFERENCE_UNITS") {
            self.endpoint.desired_inference_units = parse_var("DESIRED_INFERENCE_UNITS", &units)?;
        }
        if let Some(secs) = lookup("POLL_INTERVAL_SECS") {
            self.poller.interval_secs = parse_var("POLL_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("POLL_TIMEOUT_SECS") {
            self.poller.timeout_secs = parse_var("POLL_TIMEOUT_SECS", &secs)?;
        }
        if let Some(flag) = lookup("FAIL_OPEN_ON_POLL_ERROR") {
            self.poller.fail_open_on_error = parse_var("FAIL_OPEN_ON_POLL_ERROR", &flag)?;
        }
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.endpoint.name_prefix;
        if prefix.is_empty() {
            return Err(AppError::validation("endpoint.name_prefix is empty"));
        }
        if prefix.len() + ENDPOINT_NAME_SUFFIX_LEN > MAX_ENDPOINT_NAME_LEN {
            return Err(AppError::validation(format!(
                "endpoint.name_prefix must be at most {} characters",
                MAX_ENDPOINT_NAME_LEN - ENDPOINT_NAME_SUFFIX_LEN
            )));
        }
        if !prefix.starts_with(|c: char| c.is_ascii_alphanumeric())
            || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(AppError::validation(
                "endpoint.name_prefix must start with a letter or digit and contain only letters, digits and '-'",
            ));
        }
        if self.endpoint.desired_inference_units <= 0 {
            return Err(AppError::validation(
                "endpoint.desired_inference_units must be > 0",
            ));
        }
        if self.poller.interval_secs == 0 {
            return Err(AppError::validation("poller.interval_secs must be > 0"));
        }
        if self.poller.timeout_secs < self.poller.interval_secs {
            return Err(AppError::validation(
                "poller.timeout_secs must be >= poller.interval_secs",
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("{key}={value:?} is invalid: {e}")))
}

/// Endpoint creation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Leading part of every generated endpoint name
    #[serde(default = "defaults::name_prefix")]
    pub name_prefix: String,

    /// Inference units requested on create and update
    #[serde(default = "defaults::desired_inference_units")]
    pub desired_inference_units: i32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name_prefix: defaults::name_prefix(),
            desired_inference_units: defaults::desired_inference_units(),
        }
    }
}

/// Completion polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between polls in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Give up after this many seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Treat describe failures as "gone" instead of surfacing them
    #[serde(default = "defaults::fail_open")]
    pub fail_open_on_error: bool,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            timeout_secs: defaults::timeout(),
            fail_open_on_error: defaults::fail_open(),
        }
    }
}

mod defaults {
    // Endpoint defaults
    pub fn name_prefix() -> String {
        "comprehend-endpoint".into()
    }
    pub fn desired_inference_units() -> i32 {
        1
    }

    // Poller defaults
    pub fn interval() -> u64 {
        5
    }
    pub fn timeout() -> u64 {
        30 * 60
    }
    pub fn fail_open() -> bool {
        true
    }
}
