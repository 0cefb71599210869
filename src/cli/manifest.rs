//! Manifest and state file handling
//!
//! Ingress manifests and target-group files are YAML (JSON is accepted as
//! well). The state file persists the in-memory provider between runs as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::cloud::{InMemoryListenerApi, ListenerSnapshot};
use crate::domain::{Ingress, Listener, ListenerArn, TargetGroupIndex};
use crate::rules::{InMemoryRuleReconciler, Rule};

/// Load an ingress manifest
pub fn load_ingress(path: &Path) -> Result<Ingress> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ingress manifest: {}", path.display()))?;
    Ingress::from_yaml(&contents)
        .with_context(|| format!("Failed to parse ingress manifest: {}", path.display()))
}

/// Load resolved target groups
pub fn load_target_groups(path: &Path) -> Result<TargetGroupIndex> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read target group file: {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse target group file: {}", path.display()))
}

/// Listeners and rules persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub listeners: Vec<Listener>,
    #[serde(default)]
    pub rules: BTreeMap<ListenerArn, Vec<Rule>>,
}

impl StateFile {
    /// Load state; a missing file is an empty state
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "State file not found, starting empty");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))
    }

    /// Write state, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;
        Ok(())
    }

    /// Build providers seeded with this state
    pub fn into_providers(self) -> (InMemoryListenerApi, InMemoryRuleReconciler) {
        (
            InMemoryListenerApi::from_snapshot(ListenerSnapshot { listeners: self.listeners }),
            InMemoryRuleReconciler::from_rules(self.rules),
        )
    }

    /// Capture the state of both providers
    pub async fn capture(cloud: &InMemoryListenerApi, rules: &InMemoryRuleReconciler) -> Self {
        Self { listeners: cloud.snapshot().await.listeners, rules: rules.all_rules() }
    }
}
