//! # Observability Infrastructure
//!
//! Structured logging for albsync: subscriber initialization, startup
//! configuration logging and the `reconcile_span!` / `cloud_span!` macros.

pub mod logging;

pub use logging::{init_logging, log_config_info};
