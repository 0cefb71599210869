//! Listener TLS annotations (`certificate-arn`, `ssl-policy`)

use std::collections::BTreeMap;

use super::{annotation_key, lookup};
use crate::domain::CertificateArn;
use crate::errors::{Error, Result};

const CERTIFICATE_ARN: &str = "certificate-arn";
const SSL_POLICY: &str = "ssl-policy";

/// TLS settings applied to HTTPS listeners
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerAnnotations {
    pub certificate_arn: Option<CertificateArn>,
    pub ssl_policy: Option<String>,
}

impl ListenerAnnotations {
    pub fn parse(annotations: &BTreeMap<String, String>, prefix: &str) -> Result<Self> {
        let certificate_arn = match lookup(annotations, prefix, CERTIFICATE_ARN) {
            Some(value) => Some(CertificateArn::parse(value).map_err(|_| {
                Error::validation_field(
                    format!("'{}' is not a valid certificate reference", value),
                    annotation_key(prefix, CERTIFICATE_ARN),
                )
            })?),
            None => None,
        };

        let ssl_policy = match lookup(annotations, prefix, SSL_POLICY) {
            Some("") => {
                return Err(Error::validation_field(
                    "SSL policy must not be empty",
                    annotation_key(prefix, SSL_POLICY),
                ))
            }
            Some(value) => Some(value.to_string()),
            None => None,
        };

        Ok(Self { certificate_arn, ssl_policy })
    }
}
