//! # Error Types
//!
//! Error types for listener reconciliation using `thiserror`.

use std::fmt;

use crate::cloud::CloudError;
use crate::rules::RuleError;

/// Custom result type for albsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for listener reconciliation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A custom action referenced by a `use-annotation` backend could not be resolved
    #[error("Failed to resolve action annotation for backend '{backend}': {message}")]
    AnnotationResolution { backend: String, message: String },

    /// A backend has no resolved target group
    #[error("Unable to find target group for backend {service_name}:{service_port}")]
    UnresolvedBackend { service_name: String, service_port: String },

    /// Desired listener configuration could not be built
    #[error("Failed to build listener config: {source}")]
    BuildConfig {
        #[source]
        source: Box<Error>,
    },

    /// The provider rejected listener creation
    #[error("Failed to create listener on load balancer '{load_balancer_arn}': {source}")]
    CreateFailed {
        load_balancer_arn: String,
        #[source]
        source: CloudError,
    },

    /// The provider rejected a listener modification
    #[error("Failed to modify listener '{listener_arn}': {source}")]
    UpdateFailed {
        listener_arn: String,
        #[source]
        source: CloudError,
    },

    /// Rule reconciliation failed after the listener was converged
    #[error("Failed to reconcile rules for listener '{listener_arn}': {source}")]
    RuleReconciliation {
        listener_arn: String,
        #[source]
        source: RuleError,
    },

    /// The caller cancelled the operation
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// A provider call exceeded its deadline
    #[error("Operation timed out: {operation} after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        context: String,
    },
}

/// Classification of an [`Error`], independent of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AnnotationResolutionFailure,
    UnresolvedBackend,
    CreateFailed,
    UpdateFailed,
    RuleReconciliationFailed,
    Cancelled,
    Timeout,
    Config,
    Validation,
    Io,
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AnnotationResolutionFailure => "annotation_resolution_failure",
            ErrorKind::UnresolvedBackend => "unresolved_backend",
            ErrorKind::CreateFailed => "create_failed",
            ErrorKind::UpdateFailed => "update_failed",
            ErrorKind::RuleReconciliationFailed => "rule_reconciliation_failed",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Config => "config",
            ErrorKind::Validation => "validation",
            ErrorKind::Io => "io",
            ErrorKind::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create an annotation resolution error
    pub fn annotation_resolution<B: Into<String>, M: Into<String>>(backend: B, message: M) -> Self {
        Self::AnnotationResolution { backend: backend.into(), message: message.into() }
    }

    /// Create an unresolved backend error
    pub fn unresolved_backend<S: Into<String>, P: ToString>(service_name: S, service_port: P) -> Self {
        Self::UnresolvedBackend {
            service_name: service_name.into(),
            service_port: service_port.to_string(),
        }
    }

    /// Tag an error as raised while building the listener config
    pub fn build_config(source: Error) -> Self {
        Self::BuildConfig { source: Box::new(source) }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled { operation: operation.into() }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration_ms: u64) -> Self {
        Self::Timeout { operation: operation.into(), duration_ms }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(
        context: S,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { source: Box::new(source), context: context.into() }
    }

    /// Classify the error. Build-stage wrappers report the kind of the wrapped error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AnnotationResolution { .. } => ErrorKind::AnnotationResolutionFailure,
            Error::UnresolvedBackend { .. } => ErrorKind::UnresolvedBackend,
            Error::BuildConfig { source } => source.kind(),
            Error::CreateFailed { .. } => ErrorKind::CreateFailed,
            Error::UpdateFailed { .. } => ErrorKind::UpdateFailed,
            Error::RuleReconciliation { .. } => ErrorKind::RuleReconciliationFailed,
            Error::Cancelled { .. } => ErrorKind::Cancelled,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Config { .. } => ErrorKind::Config,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Io { .. } => ErrorKind::Io,
            Error::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Check if re-invoking reconciliation may succeed.
    ///
    /// Nothing in this crate retries; this is a hint for the caller's requeue policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::CreateFailed { source, .. } | Error::UpdateFailed { source, .. } => {
                source.is_retryable()
            }
            Error::RuleReconciliation { .. } => true,
            Error::Timeout { .. } => true,
            Error::Io { .. } => true,
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::io("I/O operation failed", error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization("JSON serialization failed", error)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization("YAML deserialization failed", error)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_source("Configuration file could not be parsed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
