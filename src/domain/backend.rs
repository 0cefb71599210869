//! Ingress backend references

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved port name marking a backend whose action comes from an annotation
pub const USE_ANNOTATION_PORT: &str = "use-annotation";

/// Service name of the built-in fallback backend
pub const DEFAULT_404_SERVICE: &str = "response-404";

/// Service port, either numeric or named
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServicePort {
    Number(u16),
    Name(String),
}

impl fmt::Display for ServicePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServicePort::Number(port) => write!(f, "{}", port),
            ServicePort::Name(name) => f.write_str(name),
        }
    }
}

impl From<u16> for ServicePort {
    fn from(port: u16) -> Self {
        ServicePort::Number(port)
    }
}

impl From<&str> for ServicePort {
    fn from(name: &str) -> Self {
        ServicePort::Name(name.to_string())
    }
}

/// Reference to a service port that traffic should reach
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackend {
    pub service_name: String,
    pub service_port: ServicePort,
}

impl IngressBackend {
    pub fn new(service_name: impl Into<String>, service_port: impl Into<ServicePort>) -> Self {
        Self { service_name: service_name.into(), service_port: service_port.into() }
    }

    /// Fallback used when a route declares no default backend
    pub fn default_404() -> Self {
        Self::new(DEFAULT_404_SERVICE, USE_ANNOTATION_PORT)
    }

    /// Whether the backend's action is supplied by an `actions.<name>` annotation
    pub fn uses_annotation(&self) -> bool {
        matches!(&self.service_port, ServicePort::Name(name) if name == USE_ANNOTATION_PORT)
    }
}

impl fmt::Display for IngressBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_name, self.service_port)
    }
}
