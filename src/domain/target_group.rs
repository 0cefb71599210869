//! Precomputed backend → target group mapping
//!
//! Target groups are resolved before listeners are reconciled. The index is
//! supplied whole by the caller and never populated by the reconciler.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::backend::{IngressBackend, ServicePort};
use super::id::TargetGroupArn;

/// One resolved backend, as stored in a target-group file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroupBinding {
    pub service_name: String,
    pub service_port: ServicePort,
    pub target_group_arn: TargetGroupArn,
}

/// Lookup of target groups by ingress backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TargetGroupBinding>", into = "Vec<TargetGroupBinding>")]
pub struct TargetGroupIndex {
    by_backend: HashMap<IngressBackend, TargetGroupArn>,
}

impl TargetGroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the target group for a backend
    pub fn insert(&mut self, backend: IngressBackend, target_group_arn: TargetGroupArn) {
        self.by_backend.insert(backend, target_group_arn);
    }

    /// Builder-style insert
    pub fn with(mut self, backend: IngressBackend, target_group_arn: impl Into<TargetGroupArn>) -> Self {
        self.insert(backend, target_group_arn.into());
        self
    }

    pub fn get(&self, backend: &IngressBackend) -> Option<&TargetGroupArn> {
        self.by_backend.get(backend)
    }

    pub fn len(&self) -> usize {
        self.by_backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_backend.is_empty()
    }
}

impl From<Vec<TargetGroupBinding>> for TargetGroupIndex {
    fn from(bindings: Vec<TargetGroupBinding>) -> Self {
        let by_backend = bindings
            .into_iter()
            .map(|b| (IngressBackend::new(b.service_name, b.service_port), b.target_group_arn))
            .collect();
        Self { by_backend }
    }
}

impl From<TargetGroupIndex> for Vec<TargetGroupBinding> {
    fn from(index: TargetGroupIndex) -> Self {
        let mut bindings: Vec<TargetGroupBinding> = index
            .by_backend
            .into_iter()
            .map(|(backend, target_group_arn)| TargetGroupBinding {
                service_name: backend.service_name,
                service_port: backend.service_port,
                target_group_arn,
            })
            .collect();
        bindings.sort_by(|a, b| {
            (&a.service_name, &a.service_port).cmp(&(&b.service_name, &b.service_port))
        });
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_backend() {
        let index = TargetGroupIndex::new().with(IngressBackend::new("svc-a", 8080), "tg-1");
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(&IngressBackend::new("svc-a", 8080)).map(|a| a.as_str()),
            Some("tg-1")
        );
        assert!(index.get(&IngressBackend::new("svc-a", 80)).is_none());
        assert!(index.get(&IngressBackend::new("svc-a", "8080")).is_none());
    }

    #[test]
    fn loads_from_yaml_list() {
        let yaml = r#"
- serviceName: svc-a
  servicePort: 8080
  targetGroupArn: tg-1
- serviceName: svc-b
  servicePort: http
  targetGroupArn: tg-2
"#;
        let index: TargetGroupIndex = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&IngressBackend::new("svc-b", "http")).map(|a| a.as_str()),
            Some("tg-2")
        );
    }
}
