//! # Structured Logging
//!
//! Subscriber setup and span macros built on the tracing ecosystem. Every
//! span created by the macros carries a fresh `operation_id` so that the log
//! lines of one reconciliation can be grouped in JSON output.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Create a tracing span for one listener reconciliation.
///
/// ```rust,ignore
/// let span = reconcile_span!("default/web", 443);
/// let span = reconcile_span!("default/web", 443, dry_run = true);
/// ```
#[macro_export]
macro_rules! reconcile_span {
    ($ingress:expr, $port:expr) => {
        tracing::info_span!(
            "reconcile_listener",
            ingress = %$ingress,
            port = $port,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($ingress:expr, $port:expr, $($field:tt)*) => {
        tracing::info_span!(
            "reconcile_listener",
            ingress = %$ingress,
            port = $port,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for a provider call
#[macro_export]
macro_rules! cloud_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "cloud_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "cloud_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. If a subscriber is
/// already installed (a second call, or a test harness) the existing one is kept.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            Error::config_with_source(format!("Invalid log level '{}'", config.log_level), Box::new(e))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if config.json_logging { builder.json().try_init() } else { builder.try_init() };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        annotation_prefix = %config.reconciler.annotation_prefix,
        cloud_call_timeout_seconds = config.reconciler.cloud_call_timeout_seconds,
        dry_run = config.reconciler.dry_run,
        json_logging = config.observability.json_logging,
        "albsync configuration"
    );
}
