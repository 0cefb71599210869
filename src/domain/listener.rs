//! Listener domain types
//!
//! This module contains the desired and observed shapes of a load balancer
//! listener. [`TargetConfiguration`] is computed fresh on every
//! reconciliation; [`Listener`] is the provider's live object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::action::RoutingAction;
use super::id::{CertificateArn, ListenerArn, LoadBalancerArn};
use crate::errors::{Error, Result};

/// Transport protocol of a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// Plain HTTP
    Http,

    /// HTTP over TLS
    Https,
}

impl Protocol {
    /// Provider spelling of the protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
        }
    }

    /// Check if this protocol requires TLS
    pub fn requires_tls(&self) -> bool {
        matches!(self, Protocol::Https)
    }

    /// Get the default port for this protocol
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(Protocol::Http),
            "HTTPS" => Ok(Protocol::Https),
            _ => Err(Error::validation_field(
                format!("Unsupported listener protocol '{}'", s),
                "protocol",
            )),
        }
    }
}

/// Port and scheme a listener is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortData {
    pub port: u16,
    pub scheme: Protocol,
}

impl PortData {
    pub fn new(port: u16, scheme: Protocol) -> Self {
        Self { port, scheme }
    }

    /// Plain HTTP on port 80
    pub fn http_default() -> Self {
        Self::new(Protocol::Http.default_port(), Protocol::Http)
    }
}

impl fmt::Display for PortData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.port)
    }
}

/// TLS certificate served by a listener
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_arn: CertificateArn,
    pub is_default: bool,
}

impl Certificate {
    /// Wrap a certificate reference as the listener's default certificate
    pub fn default_for(certificate_arn: CertificateArn) -> Self {
        Self { certificate_arn, is_default: true }
    }
}

/// Desired listener state computed from declarative input.
///
/// Fields are private: a configuration can only be produced through
/// [`TargetConfiguration::new`], which guarantees a non-empty action chain,
/// and [`TargetConfiguration::with_tls`], which guarantees at most one
/// default certificate. An empty certificate list means "omit certificates".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetConfiguration {
    port: u16,
    protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssl_policy: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    certificates: Vec<Certificate>,
    default_actions: Vec<RoutingAction>,
}

impl TargetConfiguration {
    /// Create a configuration without TLS material
    pub fn new(port: PortData, default_actions: Vec<RoutingAction>) -> Result<Self> {
        if default_actions.is_empty() {
            return Err(Error::validation_field(
                "Listener default actions must not be empty",
                "default_actions",
            ));
        }
        Ok(Self {
            port: port.port,
            protocol: port.scheme,
            ssl_policy: None,
            certificates: Vec::new(),
            default_actions,
        })
    }

    /// Attach TLS certificates and policy
    pub fn with_tls(mut self, certificates: Vec<Certificate>, ssl_policy: Option<String>) -> Result<Self> {
        let defaults = certificates.iter().filter(|c| c.is_default).count();
        if defaults > 1 {
            return Err(Error::validation_field(
                format!("At most one default certificate is allowed, found {}", defaults),
                "certificates",
            ));
        }
        self.certificates = certificates;
        self.ssl_policy = ssl_policy;
        Ok(self)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn ssl_policy(&self) -> Option<&str> {
        self.ssl_policy.as_deref()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn default_actions(&self) -> &[RoutingAction] {
        &self.default_actions
    }

    /// The certificate marked default, if any
    pub fn default_certificate(&self) -> Option<&Certificate> {
        self.certificates.iter().find(|c| c.is_default)
    }
}

/// Live listener as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub listener_arn: ListenerArn,
    pub load_balancer_arn: LoadBalancerArn,
    pub port: u16,
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<Certificate>,
    pub default_actions: Vec<RoutingAction>,
}

impl Listener {
    /// Materialize a configuration under a provider-assigned identifier
    pub fn from_config(
        listener_arn: ListenerArn,
        load_balancer_arn: LoadBalancerArn,
        config: &TargetConfiguration,
    ) -> Self {
        Self {
            listener_arn,
            load_balancer_arn,
            port: config.port,
            protocol: config.protocol,
            ssl_policy: config.ssl_policy.clone(),
            certificates: config.certificates.clone(),
            default_actions: config.default_actions.clone(),
        }
    }

    /// Port descriptor of this listener
    pub fn port_data(&self) -> PortData {
        PortData::new(self.port, self.protocol)
    }
}
