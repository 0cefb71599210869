//! # Configuration Settings
//!
//! Defines the configuration structure for albsync.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::annotations::DEFAULT_ANNOTATION_PREFIX;
use crate::errors::{Error, Result};

pub const ENV_ANNOTATION_PREFIX: &str = "ALBSYNC_ANNOTATION_PREFIX";
pub const ENV_CLOUD_CALL_TIMEOUT_SECONDS: &str = "ALBSYNC_CLOUD_CALL_TIMEOUT_SECONDS";
pub const ENV_DRY_RUN: &str = "ALBSYNC_DRY_RUN";
pub const ENV_LOG_LEVEL: &str = "ALBSYNC_LOG_LEVEL";
pub const ENV_JSON_LOGGING: &str = "ALBSYNC_JSON_LOGGING";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Listener reconciliation settings
    #[validate(nested)]
    pub reconciler: ReconcilerConfig,

    /// Logging settings
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// TOML file overridden by environment variables
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config file {}", path.display()), e))?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::config_with_source("Invalid config file", Box::new(e)))
    }

    /// Apply `ALBSYNC_*` overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.reconciler.apply_env()?;
        self.observability.apply_env()?;
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        if self.reconciler.annotation_prefix.chars().any(char::is_whitespace) {
            return Err(Error::validation_field(
                "Annotation prefix must not contain whitespace",
                "reconciler.annotation_prefix",
            ));
        }

        Ok(())
    }
}

/// Listener reconciliation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Prefix of the ingress annotations to read
    #[validate(length(min = 1, message = "Annotation prefix cannot be empty"))]
    pub annotation_prefix: String,

    /// Deadline for each provider call
    #[validate(range(
        min = 1,
        max = 600,
        message = "Cloud call timeout must be between 1 and 600 seconds"
    ))]
    pub cloud_call_timeout_seconds: u64,

    /// Compute plans without calling the provider
    pub dry_run: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            annotation_prefix: DEFAULT_ANNOTATION_PREFIX.to_string(),
            cloud_call_timeout_seconds: 30,
            dry_run: false,
        }
    }
}

impl ReconcilerConfig {
    pub fn cloud_call_timeout(&self) -> Duration {
        Duration::from_secs(self.cloud_call_timeout_seconds)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(prefix) = env_var::<String>(ENV_ANNOTATION_PREFIX)? {
            self.annotation_prefix = prefix;
        }
        if let Some(seconds) = env_var(ENV_CLOUD_CALL_TIMEOUT_SECONDS)? {
            self.cloud_call_timeout_seconds = seconds;
        }
        if let Some(dry_run) = env_bool(ENV_DRY_RUN)? {
            self.dry_run = dry_run;
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            service_name: crate::APP_NAME.to_string(),
        }
    }
}

impl ObservabilityConfig {
    fn apply_env(&mut self) -> Result<()> {
        if let Some(level) = env_var::<String>(ENV_LOG_LEVEL)? {
            self.log_level = level;
        }
        if let Some(json) = env_bool(ENV_JSON_LOGGING)? {
            self.json_logging = json;
        }
        Ok(())
    }
}

fn env_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid {}: {}", name, e))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::config(format!("Invalid {}: {}", name, e))),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(raw) = env_var::<String>(name)? else {
        return Ok(None);
    };
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(Error::config(format!("Invalid {}: expected a boolean, got '{}'", name, raw))),
    }
}
