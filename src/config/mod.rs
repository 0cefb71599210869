//! # Configuration Management
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `ALBSYNC_*` environment variables. The result is validated before use.

pub mod settings;

pub use settings::{
    AppConfig, ObservabilityConfig, ReconcilerConfig, ENV_ANNOTATION_PREFIX,
    ENV_CLOUD_CALL_TIMEOUT_SECONDS, ENV_DRY_RUN, ENV_JSON_LOGGING, ENV_LOG_LEVEL,
};
