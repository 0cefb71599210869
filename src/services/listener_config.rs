//! Desired Configuration Builder

use crate::annotations::AnnotationStore;
use crate::domain::{Certificate, TargetConfiguration};
use crate::errors::{Error, Result};

use super::action_resolver::resolve_default_actions;
use super::request::ReconcileRequest;

/// Compute the desired listener configuration for a request.
///
/// Pure: no provider calls, and equal requests yield equal configurations.
/// TLS material is only attached to HTTPS listeners; without a certificate
/// annotation the certificate list is left empty and the provider decides.
/// Failures are wrapped in [`Error::BuildConfig`].
pub fn build_listener_config(request: &ReconcileRequest<'_>) -> Result<TargetConfiguration> {
    build(request).map_err(Error::build_config)
}

fn build(request: &ReconcileRequest<'_>) -> Result<TargetConfiguration> {
    let annotations: &dyn AnnotationStore = request.annotations;

    let actions =
        resolve_default_actions(request.ingress.default_backend(), annotations, request.target_groups)?;
    let config = TargetConfiguration::new(request.port, actions)?;

    if !request.port.scheme.requires_tls() {
        return Ok(config);
    }

    let certificates = annotations
        .certificate_ref()
        .cloned()
        .map(Certificate::default_for)
        .into_iter()
        .collect();
    config.with_tls(certificates, annotations.ssl_policy().map(str::to_string))
}
