//! Test doubles for the provider and the rule reconciler

use async_trait::async_trait;
use std::sync::Mutex;

use albsync::annotations::IngressAnnotations;
use albsync::cloud::{CloudResult, ListenerApi};
use albsync::domain::{
    Ingress, Listener, ListenerArn, LoadBalancerArn, TargetConfiguration, TargetGroupIndex,
};
use albsync::rules::{RuleError, RuleReconciler, RuleSyncResult};

/// Records the listener each rule sync was invoked with
#[derive(Debug, Default)]
pub struct RecordingRuleReconciler {
    calls: Mutex<Vec<ListenerArn>>,
}

impl RecordingRuleReconciler {
    pub fn calls(&self) -> Vec<ListenerArn> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RuleReconciler for RecordingRuleReconciler {
    async fn reconcile(
        &self,
        listener: &Listener,
        _ingress: &Ingress,
        _annotations: &IngressAnnotations,
        _target_groups: &TargetGroupIndex,
    ) -> Result<RuleSyncResult, RuleError> {
        self.calls.lock().expect("calls lock").push(listener.listener_arn.clone());
        Ok(RuleSyncResult::default())
    }
}

/// Always fails the rule stage
#[derive(Debug, Default)]
pub struct FailingRuleReconciler;

#[async_trait]
impl RuleReconciler for FailingRuleReconciler {
    async fn reconcile(
        &self,
        _listener: &Listener,
        _ingress: &Ingress,
        _annotations: &IngressAnnotations,
        _target_groups: &TargetGroupIndex,
    ) -> Result<RuleSyncResult, RuleError> {
        Err(RuleError::TooManyRules { count: 101, limit: 100 })
    }
}

/// Provider whose mutations never complete
#[derive(Debug, Default)]
pub struct PendingListenerApi;

#[async_trait]
impl ListenerApi for PendingListenerApi {
    async fn create_listener(
        &self,
        _load_balancer_arn: &LoadBalancerArn,
        _config: &TargetConfiguration,
    ) -> CloudResult<Listener> {
        std::future::pending().await
    }

    async fn modify_listener(
        &self,
        _listener_arn: &ListenerArn,
        _config: &TargetConfiguration,
    ) -> CloudResult<Listener> {
        std::future::pending().await
    }

    async fn describe_listeners(&self, _load_balancer_arn: &LoadBalancerArn) -> CloudResult<Vec<Listener>> {
        Ok(Vec::new())
    }
}
