//! Error types for cloud provider calls.

use thiserror::Error;

/// Errors returned by a [`super::ListenerApi`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    /// The provider rejected the request.
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// The provider throttled the request.
    #[error("Request throttled: {message}")]
    Throttled { message: String },

    /// The referenced resource does not exist.
    #[error("{resource_type} not found: {id}")]
    NotFound { resource_type: String, id: String },

    /// The request never reached the provider or the response was lost.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl CloudError {
    /// Create an API error.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api { code: code.into(), message: message.into() }
    }

    /// Create a not found error.
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Check if the cloud client could succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CloudError::Throttled { .. } | CloudError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CloudError::api("DuplicateListener", "port 80 is taken");
        assert_eq!(err.to_string(), "DuplicateListener: port 80 is taken");

        let err = CloudError::not_found("Listener", "ls-1");
        assert_eq!(err.to_string(), "Listener not found: ls-1");
    }

    #[test]
    fn test_retryable() {
        assert!(CloudError::Throttled { message: "rate".into() }.is_retryable());
        assert!(CloudError::Transport("reset".into()).is_retryable());
        assert!(!CloudError::api("ValidationError", "bad").is_retryable());
        assert!(!CloudError::not_found("Listener", "ls-1").is_retryable());
    }
}
