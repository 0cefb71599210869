//! # Ingress Annotations
//!
//! Typed views over the `<prefix>/<name>` annotations of an ingress. Parsing
//! happens once per reconciliation; malformed values fail here with a
//! validation error naming the offending key, while a missing custom action
//! only fails later when a `use-annotation` backend actually asks for it.

pub mod action;
pub mod listen_ports;
pub mod listener;

use std::collections::BTreeMap;

use crate::domain::{CertificateArn, Ingress, PortData, RoutingAction};
use crate::errors::Result;

pub use action::ActionAnnotations;
pub use listen_ports::parse_listen_ports;
pub use listener::ListenerAnnotations;

/// Annotation prefix used when none is configured
pub const DEFAULT_ANNOTATION_PREFIX: &str = "alb.ingress.kubernetes.io";

/// Read access to parsed annotations needed while building a listener
pub trait AnnotationStore: Send + Sync {
    /// Custom action declared for a `use-annotation` backend
    fn get_custom_action(&self, backend_name: &str) -> Result<RoutingAction>;

    /// Certificate to serve on HTTPS listeners
    fn certificate_ref(&self) -> Option<&CertificateArn>;

    /// TLS negotiation policy for HTTPS listeners
    fn ssl_policy(&self) -> Option<&str>;
}

/// All annotations relevant to listener reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressAnnotations {
    pub listener: ListenerAnnotations,
    pub actions: ActionAnnotations,
    pub listen_ports: Vec<PortData>,
}

impl Default for IngressAnnotations {
    fn default() -> Self {
        Self {
            listener: ListenerAnnotations::default(),
            actions: ActionAnnotations::default(),
            listen_ports: vec![PortData::http_default()],
        }
    }
}

impl IngressAnnotations {
    /// Parse the annotations carrying `prefix`
    pub fn parse(annotations: &BTreeMap<String, String>, prefix: &str) -> Result<Self> {
        Ok(Self {
            listener: ListenerAnnotations::parse(annotations, prefix)?,
            actions: ActionAnnotations::parse(annotations, prefix)?,
            listen_ports: parse_listen_ports(annotations, prefix)?,
        })
    }

    /// Parse the annotations of an ingress
    pub fn from_ingress(ingress: &Ingress, prefix: &str) -> Result<Self> {
        Self::parse(&ingress.metadata.annotations, prefix)
    }
}

impl AnnotationStore for IngressAnnotations {
    fn get_custom_action(&self, backend_name: &str) -> Result<RoutingAction> {
        self.actions.get(backend_name)
    }

    fn certificate_ref(&self) -> Option<&CertificateArn> {
        self.listener.certificate_arn.as_ref()
    }

    fn ssl_policy(&self) -> Option<&str> {
        self.listener.ssl_policy.as_deref()
    }
}

/// Full annotation key for `name`
pub(crate) fn annotation_key(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

/// Trimmed value of an annotation. Blank values come back as `""` so the
/// caller can reject them under its own key.
pub(crate) fn lookup<'a>(
    annotations: &'a BTreeMap<String, String>,
    prefix: &str,
    name: &str,
) -> Option<&'a str> {
    annotations
        .get(&annotation_key(prefix, name))
        .map(|value| value.trim())
}
