//! Ingress route specification
//!
//! The subset of a Kubernetes `Ingress` that drives listener and rule
//! reconciliation: metadata with annotations, an optional default backend,
//! and host/path rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::backend::IngressBackend;
use crate::errors::{Error, Result};

/// Ingress resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingress {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: IngressSpec,
}

/// Object metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

fn default_namespace() -> String {
    "default".to_string()
}

/// Ingress specification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressSpec {
    /// Backend for requests that match no rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<IngressBackend>,

    #[serde(default)]
    pub rules: Vec<IngressRule>,
}

/// Host-scoped rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpIngressRuleValue>,
}

/// HTTP paths of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpIngressRuleValue {
    pub paths: Vec<HttpIngressPath>,
}

/// Single path mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpIngressPath {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub backend: IngressBackend,
}

impl Ingress {
    /// Parse an ingress manifest
    pub fn from_yaml(source: &str) -> Result<Self> {
        let ingress: Ingress = serde_yaml::from_str(source)?;
        if ingress.metadata.name.is_empty() {
            return Err(Error::validation_field("Ingress name must not be empty", "metadata.name"));
        }
        Ok(ingress)
    }

    /// `namespace/name` key used in logs
    pub fn key(&self) -> String {
        format!("{}/{}", self.metadata.namespace, self.metadata.name)
    }

    /// Default backend of the ingress
    pub fn default_backend(&self) -> Option<&IngressBackend> {
        self.spec.backend.as_ref()
    }

    /// Every backend referenced by the ingress, default backend first
    pub fn backends(&self) -> impl Iterator<Item = &IngressBackend> {
        self.spec.backend.iter().chain(
            self.spec
                .rules
                .iter()
                .filter_map(|rule| rule.http.as_ref())
                .flat_map(|http| http.paths.iter().map(|p| &p.backend)),
        )
    }
}
