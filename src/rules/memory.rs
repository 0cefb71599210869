//! In-memory rule reconciler

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::{desired_rules, Rule, RuleError, RuleReconciler, RuleSyncResult};
use crate::annotations::IngressAnnotations;
use crate::domain::{Ingress, Listener, ListenerArn, TargetGroupIndex};

/// Stores the converged rule list of each listener
#[derive(Debug, Default)]
pub struct InMemoryRuleReconciler {
    rules: DashMap<ListenerArn, Vec<Rule>>,
}

impl InMemoryRuleReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore previously converged rules
    pub fn from_rules(rules: BTreeMap<ListenerArn, Vec<Rule>>) -> Self {
        Self { rules: rules.into_iter().collect() }
    }

    /// Rules currently attached to a listener
    pub fn rules_for(&self, listener_arn: &ListenerArn) -> Vec<Rule> {
        self.rules.get(listener_arn).map(|entry| entry.clone()).unwrap_or_default()
    }

    /// Every listener's rules, ordered by listener ARN
    pub fn all_rules(&self) -> BTreeMap<ListenerArn, Vec<Rule>> {
        self.rules.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }
}

#[async_trait]
impl RuleReconciler for InMemoryRuleReconciler {
    #[instrument(skip_all, fields(listener_arn = %listener.listener_arn), name = "reconcile_rules")]
    async fn reconcile(
        &self,
        listener: &Listener,
        ingress: &Ingress,
        annotations: &IngressAnnotations,
        target_groups: &TargetGroupIndex,
    ) -> Result<RuleSyncResult, RuleError> {
        let desired = desired_rules(ingress, annotations, target_groups)?;
        let existing = self.rules_for(&listener.listener_arn);

        let unchanged = desired.iter().filter(|rule| existing.contains(rule)).count();
        let result = RuleSyncResult {
            rules_created: desired.len() - unchanged,
            rules_removed: existing.iter().filter(|rule| !desired.contains(rule)).count(),
            rules_unchanged: unchanged,
        };

        self.rules.insert(listener.listener_arn.clone(), desired);

        info!(
            listener_arn = %listener.listener_arn,
            rules_created = result.rules_created,
            rules_removed = result.rules_removed,
            rules_unchanged = result.rules_unchanged,
            "Listener rules synchronized"
        );

        Ok(result)
    }
}
