//! Desired rule derivation
//!
//! Rules are numbered in declaration order starting at priority 1, one per
//! host/path pair. Actions go through the same resolver as the listener's
//! default actions, so `use-annotation` backends and unresolved target
//! groups behave identically in both places.

use serde::{Deserialize, Serialize};

use super::RuleError;
use crate::annotations::AnnotationStore;
use crate::domain::{Ingress, RoutingAction, TargetGroupIndex};
use crate::services::action_resolver::resolve_backend_actions;

/// Provider limit on rules per listener, excluding the default rule
pub const MAX_RULES_PER_LISTENER: usize = 100;

/// Match conditions of a rule; `None` matches anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// One listener rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub priority: u32,
    pub conditions: RuleConditions,
    pub actions: Vec<RoutingAction>,
}

pub fn desired_rules(
    ingress: &Ingress,
    annotations: &dyn AnnotationStore,
    target_groups: &TargetGroupIndex,
) -> Result<Vec<Rule>, RuleError> {
    let paths: Vec<_> = ingress
        .spec
        .rules
        .iter()
        .filter_map(|rule| rule.http.as_ref().map(|http| (rule.host.as_ref(), http)))
        .flat_map(|(host, http)| http.paths.iter().map(move |path| (host, path)))
        .collect();

    if paths.len() > MAX_RULES_PER_LISTENER {
        return Err(RuleError::TooManyRules { count: paths.len(), limit: MAX_RULES_PER_LISTENER });
    }

    let mut rules = Vec::with_capacity(paths.len());
    for (priority, (host, path)) in (1u32..).zip(paths) {
        let actions = resolve_backend_actions(&path.backend, annotations, target_groups)
            .map_err(|e| RuleError::Resolution { priority, source: Box::new(e) })?;
        rules.push(Rule {
            priority,
            conditions: RuleConditions { host: host.cloned(), path: path.path.clone() },
            actions,
        });
    }
    Ok(rules)
}
