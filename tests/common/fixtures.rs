//! Manifest and index fixtures

use std::collections::BTreeMap;

use albsync::annotations::{IngressAnnotations, DEFAULT_ANNOTATION_PREFIX};
use albsync::domain::{Ingress, IngressBackend, LoadBalancerArn, TargetGroupIndex};

pub const LOAD_BALANCER_ARN: &str =
    "arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/web/50dc6c495c0c9188";

pub fn load_balancer() -> LoadBalancerArn {
    LoadBalancerArn::new(LOAD_BALANCER_ARN)
}

/// Ingress whose default backend is `service:port`
pub fn ingress_with_backend(service: &str, port: u16) -> Ingress {
    Ingress::from_yaml(&format!(
        "metadata:\n  name: web\nspec:\n  backend:\n    serviceName: \"{service}\"\n    servicePort: {port}\n"
    ))
    .expect("valid ingress")
}

/// Ingress with a `use-annotation` default backend
pub fn ingress_with_annotation_backend(service: &str) -> Ingress {
    Ingress::from_yaml(&format!(
        "metadata:\n  name: web\nspec:\n  backend:\n    serviceName: \"{service}\"\n    servicePort: use-annotation\n"
    ))
    .expect("valid ingress")
}

/// Ingress without a default backend
pub fn ingress_without_backend() -> Ingress {
    Ingress::from_yaml("metadata:\n  name: web\nspec: {}\n").expect("valid ingress")
}

/// Ingress with a default backend and one path rule on the same service
pub fn ingress_with_rule(service: &str, port: u16) -> Ingress {
    Ingress::from_yaml(&format!(
        r#"
metadata:
  name: web
spec:
  backend:
    serviceName: "{service}"
    servicePort: {port}
  rules:
    - host: shop.example.com
      http:
        paths:
          - path: /api/*
            backend:
              serviceName: "{service}"
              servicePort: {port}
"#
    ))
    .expect("valid ingress")
}

pub fn target_groups(entries: &[(&str, u16, &str)]) -> TargetGroupIndex {
    entries.iter().fold(TargetGroupIndex::new(), |index, (service, port, arn)| {
        index.with(IngressBackend::new(*service, *port), *arn)
    })
}

/// Parse `name → value` pairs under the default prefix
pub fn annotations(pairs: &[(&str, &str)]) -> IngressAnnotations {
    let raw: BTreeMap<String, String> = pairs
        .iter()
        .map(|(name, value)| (format!("{}/{}", DEFAULT_ANNOTATION_PREFIX, name), value.to_string()))
        .collect();
    IngressAnnotations::parse(&raw, DEFAULT_ANNOTATION_PREFIX).expect("valid annotations")
}
