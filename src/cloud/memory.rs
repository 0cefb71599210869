//! In-memory listener provider
//!
//! Behaves like the provider for the operations reconciliation uses: it
//! assigns listener ARNs, rejects duplicate ports on one load balancer and
//! reports unknown listeners as not found. Call counters and one-shot
//! failure injection make it usable as a test double; snapshots let the CLI
//! persist it between runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{CloudError, CloudResult, ListenerApi};
use crate::domain::{Listener, ListenerArn, LoadBalancerArn, TargetConfiguration};

/// Serializable provider state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerSnapshot {
    #[serde(default)]
    pub listeners: Vec<Listener>,
}

#[derive(Debug, Default)]
struct State {
    listeners: BTreeMap<ListenerArn, Listener>,
    injected_failure: Option<CloudError>,
}

/// Listener provider backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryListenerApi {
    state: RwLock<State>,
    create_calls: AtomicUsize,
    modify_calls: AtomicUsize,
}

impl InMemoryListenerApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore provider state from a snapshot
    pub fn from_snapshot(snapshot: ListenerSnapshot) -> Self {
        let listeners = snapshot
            .listeners
            .into_iter()
            .map(|listener| (listener.listener_arn.clone(), listener))
            .collect();
        Self {
            state: RwLock::new(State { listeners, injected_failure: None }),
            ..Self::default()
        }
    }

    /// Capture the current provider state
    pub async fn snapshot(&self) -> ListenerSnapshot {
        let state = self.state.read().await;
        ListenerSnapshot { listeners: state.listeners.values().cloned().collect() }
    }

    /// Make the next create or modify call fail with `error`
    pub async fn fail_next(&self, error: CloudError) {
        self.state.write().await.injected_failure = Some(error);
    }

    /// Look up a listener by ARN
    pub async fn get(&self, listener_arn: &ListenerArn) -> Option<Listener> {
        self.state.read().await.listeners.get(listener_arn).cloned()
    }

    /// Number of create calls received, including failed ones
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of modify calls received, including failed ones
    pub fn modify_calls(&self) -> usize {
        self.modify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListenerApi for InMemoryListenerApi {
    async fn create_listener(
        &self,
        load_balancer_arn: &LoadBalancerArn,
        config: &TargetConfiguration,
    ) -> CloudResult<Listener> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if let Some(error) = state.injected_failure.take() {
            return Err(error);
        }

        ensure_port_free(&state, load_balancer_arn, config.port(), None)?;

        let listener =
            Listener::from_config(listener_arn_for(load_balancer_arn), load_balancer_arn.clone(), config);
        debug!(listener_arn = %listener.listener_arn, port = listener.port, "Stored new listener");
        state.listeners.insert(listener.listener_arn.clone(), listener.clone());
        Ok(listener)
    }

    async fn modify_listener(
        &self,
        listener_arn: &ListenerArn,
        config: &TargetConfiguration,
    ) -> CloudResult<Listener> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if let Some(error) = state.injected_failure.take() {
            return Err(error);
        }

        let load_balancer_arn = state
            .listeners
            .get(listener_arn)
            .map(|existing| existing.load_balancer_arn.clone())
            .ok_or_else(|| CloudError::not_found("Listener", listener_arn.as_str()))?;
        ensure_port_free(&state, &load_balancer_arn, config.port(), Some(listener_arn))?;

        let listener = Listener::from_config(listener_arn.clone(), load_balancer_arn, config);
        state.listeners.insert(listener_arn.clone(), listener.clone());
        Ok(listener)
    }

    async fn describe_listeners(&self, load_balancer_arn: &LoadBalancerArn) -> CloudResult<Vec<Listener>> {
        let state = self.state.read().await;
        let mut listeners: Vec<Listener> = state
            .listeners
            .values()
            .filter(|listener| &listener.load_balancer_arn == load_balancer_arn)
            .cloned()
            .collect();
        listeners.sort_by_key(|listener| listener.port);
        Ok(listeners)
    }
}

fn ensure_port_free(
    state: &State,
    load_balancer_arn: &LoadBalancerArn,
    port: u16,
    except: Option<&ListenerArn>,
) -> CloudResult<()> {
    let taken = state.listeners.values().any(|listener| {
        &listener.load_balancer_arn == load_balancer_arn
            && listener.port == port
            && Some(&listener.listener_arn) != except
    });
    if taken {
        return Err(CloudError::api(
            "DuplicateListener",
            format!("A listener already exists on {} with port {}", load_balancer_arn, port),
        ));
    }
    Ok(())
}

/// Derive a listener ARN from its load balancer ARN
fn listener_arn_for(load_balancer_arn: &LoadBalancerArn) -> ListenerArn {
    let id = Uuid::new_v4().simple().to_string();
    let suffix = &id[..16];
    match load_balancer_arn.as_str().split_once(":loadbalancer/") {
        Some((head, tail)) => ListenerArn::new(format!("{}:listener/{}/{}", head, tail, suffix)),
        None => ListenerArn::new(format!("{}/listener/{}", load_balancer_arn, suffix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PortData, Protocol, RoutingAction};

    fn config(port: u16) -> TargetConfiguration {
        TargetConfiguration::new(PortData::new(port, Protocol::Http), vec![RoutingAction::forward("tg-1")])
            .unwrap()
    }

    fn lb() -> LoadBalancerArn {
        LoadBalancerArn::new("arn:aws:elasticloadbalancing:us-east-1:123:loadbalancer/app/web/abc")
    }

    #[tokio::test]
    async fn create_assigns_listener_arn() {
        let api = InMemoryListenerApi::new();
        let listener = api.create_listener(&lb(), &config(80)).await.unwrap();

        assert!(listener
            .listener_arn
            .as_str()
            .starts_with("arn:aws:elasticloadbalancing:us-east-1:123:listener/app/web/abc/"));
        assert_eq!(listener.load_balancer_arn, lb());
        assert_eq!(api.create_calls(), 1);
        assert_eq!(api.get(&listener.listener_arn).await, Some(listener));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_port() {
        let api = InMemoryListenerApi::new();
        api.create_listener(&lb(), &config(80)).await.unwrap();
        let err = api.create_listener(&lb(), &config(80)).await.unwrap_err();
        assert!(matches!(err, CloudError::Api { ref code, .. } if code == "DuplicateListener"));

        // Same port on another load balancer is fine.
        api.create_listener(&LoadBalancerArn::new("lb-2"), &config(80)).await.unwrap();
    }

    #[tokio::test]
    async fn modify_keeps_identity() {
        let api = InMemoryListenerApi::new();
        let created = api.create_listener(&lb(), &config(8080)).await.unwrap();
        let modified = api.modify_listener(&created.listener_arn, &config(80)).await.unwrap();

        assert_eq!(modified.listener_arn, created.listener_arn);
        assert_eq!(modified.port, 80);
        assert_eq!(api.modify_calls(), 1);
    }

    #[tokio::test]
    async fn modify_unknown_listener_is_not_found() {
        let api = InMemoryListenerApi::new();
        let err = api.modify_listener(&ListenerArn::new("missing"), &config(80)).await.unwrap_err();
        assert!(matches!(err, CloudError::NotFound { .. }));
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let api = InMemoryListenerApi::new();
        api.fail_next(CloudError::Transport("connection reset".into())).await;

        assert!(api.create_listener(&lb(), &config(80)).await.is_err());
        assert!(api.create_listener(&lb(), &config(80)).await.is_ok());
        assert_eq!(api.create_calls(), 2);
    }

    #[tokio::test]
    async fn snapshot_round_trip_preserves_listeners() {
        let api = InMemoryListenerApi::new();
        api.create_listener(&lb(), &config(443)).await.unwrap();
        api.create_listener(&lb(), &config(80)).await.unwrap();

        let restored = InMemoryListenerApi::from_snapshot(api.snapshot().await);
        let ports: Vec<u16> =
            restored.describe_listeners(&lb()).await.unwrap().iter().map(|l| l.port).collect();
        assert_eq!(ports, vec![80, 443]);
    }
}
