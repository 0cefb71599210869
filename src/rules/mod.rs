//! # Listener Rules
//!
//! Host/path rules attached to a listener after the listener itself has
//! converged. The listener reconciler only depends on [`RuleReconciler`];
//! [`InMemoryRuleReconciler`] is the bundled implementation.

pub mod desired;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::annotations::IngressAnnotations;
use crate::cloud::CloudError;
use crate::domain::{Ingress, Listener, TargetGroupIndex};

pub use desired::{desired_rules, Rule, RuleConditions, MAX_RULES_PER_LISTENER};
pub use memory::InMemoryRuleReconciler;

/// Errors raised while converging listener rules
#[derive(Error, Debug)]
pub enum RuleError {
    /// A rule's backend could not be turned into actions
    #[error("Failed to resolve actions for rule {priority}: {source}")]
    Resolution {
        priority: u32,
        #[source]
        source: Box<crate::errors::Error>,
    },

    /// The ingress declares more rules than a listener can hold
    #[error("Listener would carry {count} rules, limit is {limit}")]
    TooManyRules { count: usize, limit: usize },

    /// The provider rejected a rule mutation
    #[error("Rule provider error: {0}")]
    Provider(#[from] CloudError),
}

/// Result of a rule sync
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RuleSyncResult {
    /// Rules added to the listener
    pub rules_created: usize,
    /// Rules dropped from the listener
    pub rules_removed: usize,
    /// Rules already in the desired state
    pub rules_unchanged: usize,
}

/// Converges the rules of one listener
#[async_trait]
pub trait RuleReconciler: Send + Sync + std::fmt::Debug {
    async fn reconcile(
        &self,
        listener: &Listener,
        ingress: &Ingress,
        annotations: &IngressAnnotations,
        target_groups: &TargetGroupIndex,
    ) -> Result<RuleSyncResult, RuleError>;
}
