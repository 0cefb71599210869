//! Reconciliation input bundle

use crate::annotations::IngressAnnotations;
use crate::domain::{Ingress, Listener, LoadBalancerArn, PortData, TargetGroupIndex};

/// Everything needed to reconcile one listener.
///
/// Borrowed from the caller for the duration of a single call and never
/// mutated. `existing` selects the lifecycle: `None` creates a listener,
/// `Some` updates it when drift is detected.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileRequest<'a> {
    pub load_balancer_arn: &'a LoadBalancerArn,
    pub ingress: &'a Ingress,
    pub annotations: &'a IngressAnnotations,
    pub port: PortData,
    pub target_groups: &'a TargetGroupIndex,
    pub existing: Option<&'a Listener>,
}

impl<'a> ReconcileRequest<'a> {
    /// Request for a listener that does not exist yet
    pub fn new(
        load_balancer_arn: &'a LoadBalancerArn,
        ingress: &'a Ingress,
        annotations: &'a IngressAnnotations,
        port: PortData,
        target_groups: &'a TargetGroupIndex,
    ) -> Self {
        Self { load_balancer_arn, ingress, annotations, port, target_groups, existing: None }
    }

    /// Attach the live listener to converge
    pub fn with_existing(mut self, existing: Option<&'a Listener>) -> Self {
        self.existing = existing;
        self
    }
}
