//! Integration tests for configuration management
//!
//! These tests validate that configuration is layered from defaults, an
//! optional TOML file and `ALBSYNC_*` environment variables.

use albsync::config::{
    AppConfig, ENV_ANNOTATION_PREFIX, ENV_CLOUD_CALL_TIMEOUT_SECONDS, ENV_DRY_RUN, ENV_JSON_LOGGING,
    ENV_LOG_LEVEL,
};
use albsync::{Error, Result};
use std::env;
use std::sync::Mutex;
use std::time::Duration;

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ALL_VARS: [&str; 5] = [
    ENV_ANNOTATION_PREFIX,
    ENV_CLOUD_CALL_TIMEOUT_SECONDS,
    ENV_DRY_RUN,
    ENV_LOG_LEVEL,
    ENV_JSON_LOGGING,
];

/// Clears the variables on creation and restores them on drop
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn clean() -> Self {
        let saved = ALL_VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
        for name in ALL_VARS {
            env::remove_var(name);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }
}

#[test]
fn test_config_defaults_integration() -> Result<()> {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::clean();

    let config = AppConfig::from_env()?;
    assert_eq!(config, AppConfig::default());
    Ok(())
}

#[test]
fn test_config_environment_integration() -> Result<()> {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::clean();

    env::set_var(ENV_ANNOTATION_PREFIX, "example.io");
    env::set_var(ENV_CLOUD_CALL_TIMEOUT_SECONDS, "45");
    env::set_var(ENV_DRY_RUN, "true");
    env::set_var(ENV_LOG_LEVEL, "debug");
    env::set_var(ENV_JSON_LOGGING, "1");

    let config = AppConfig::from_env()?;
    assert_eq!(config.reconciler.annotation_prefix, "example.io");
    assert_eq!(config.reconciler.cloud_call_timeout(), Duration::from_secs(45));
    assert!(config.reconciler.dry_run);
    assert_eq!(config.observability.log_level, "debug");
    assert!(config.observability.json_logging);
    Ok(())
}

#[test]
fn test_invalid_environment_values() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::clean();

    env::set_var(ENV_CLOUD_CALL_TIMEOUT_SECONDS, "soon");
    assert!(matches!(AppConfig::from_env(), Err(Error::Config { .. })));

    env::set_var(ENV_CLOUD_CALL_TIMEOUT_SECONDS, "0");
    assert!(matches!(AppConfig::from_env(), Err(Error::Validation { .. })));

    env::remove_var(ENV_CLOUD_CALL_TIMEOUT_SECONDS);
    env::set_var(ENV_DRY_RUN, "maybe");
    assert!(matches!(AppConfig::from_env(), Err(Error::Config { .. })));
}

#[test]
fn test_environment_overrides_file() -> Result<()> {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::clean();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("albsync.toml");
    std::fs::write(
        &path,
        r#"
[reconciler]
annotation_prefix = "file.example.io"
cloud_call_timeout_seconds = 10

[observability]
log_level = "warn"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from_path(&path)?;
    assert_eq!(config.reconciler.annotation_prefix, "file.example.io");
    assert_eq!(config.reconciler.cloud_call_timeout_seconds, 10);
    assert_eq!(config.observability.log_level, "warn");

    env::set_var(ENV_CLOUD_CALL_TIMEOUT_SECONDS, "20");
    let config = AppConfig::load_from_path(&path)?;
    assert_eq!(config.reconciler.annotation_prefix, "file.example.io");
    assert_eq!(config.reconciler.cloud_call_timeout_seconds, 20);
    Ok(())
}

#[test]
fn test_missing_config_file_is_io_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::clean();

    let err = AppConfig::load_from_path("/nonexistent/albsync.toml").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
