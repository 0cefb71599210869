//! Lifecycle Reconciler
//!
//! Converges one listener in a single pass: build the desired configuration,
//! then either create the listener or update it when drift is detected, then
//! hand the resulting listener to the rule reconciler.
//!
//! At most one create-or-modify call is issued per reconciliation and it is
//! never retried here. Convergence is not atomic: when the rule stage fails
//! the listener mutation stays committed and only the rule error is returned.
//! Re-invoking reconciliation retries the rule stage against the now
//! converged listener.
//!
//! Provider calls honour the context's cancellation token and deadline. A
//! cancelled or expired call returns promptly and nothing is rolled back.
//! Callers must serialize reconciliations of the same listener.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn, Instrument};

use crate::cloud::ListenerApi;
use crate::config::ReconcilerConfig;
use crate::domain::{Listener, ListenerArn, LoadBalancerArn, PortData, TargetConfiguration};
use crate::errors::{Error, Result};
use crate::rules::RuleReconciler;

use super::drift::{DriftReport, ListenerField};
use super::listener_config::build_listener_config;
use super::request::ReconcileRequest;

/// Cancellation and deadline applied to provider calls
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    cancellation: CancellationToken,
    timeout: Duration,
}

impl ReconcileContext {
    pub fn new(cancellation: CancellationToken, timeout: Duration) -> Self {
        Self { cancellation, timeout }
    }

    pub fn from_config(config: &ReconcilerConfig, cancellation: CancellationToken) -> Self {
        Self::new(cancellation, config.cloud_call_timeout())
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Race `future` against cancellation and the deadline
    async fn guard<F: Future>(&self, operation: &'static str, future: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Error::cancelled(operation)),
            outcome = tokio::time::timeout(self.timeout, future) => outcome.map_err(|_| {
                Error::timeout(operation, u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
            }),
        }
    }
}

impl Default for ReconcileContext {
    fn default() -> Self {
        Self::from_config(&ReconcilerConfig::default(), CancellationToken::new())
    }
}

/// Change reconciliation would make to one listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedChange {
    Create,
    Update { changed_fields: Vec<ListenerField> },
    Unchanged,
}

/// Desired configuration and planned change for one listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerPlan {
    pub port: PortData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listener_arn: Option<ListenerArn>,
    pub change: PlannedChange,
    pub target: TargetConfiguration,
}

/// Create-or-update decision, chosen by whether a live listener was supplied
enum Lifecycle<'a> {
    Create,
    UpdateIfDrifted(&'a Listener),
}

impl<'a> Lifecycle<'a> {
    fn of(request: &ReconcileRequest<'a>) -> Self {
        match request.existing {
            Some(existing) => Lifecycle::UpdateIfDrifted(existing),
            None => Lifecycle::Create,
        }
    }
}

/// Service converging listeners against a provider
#[derive(Debug, Clone)]
pub struct ListenerReconciler {
    cloud: Arc<dyn ListenerApi>,
    rules: Arc<dyn RuleReconciler>,
}

impl ListenerReconciler {
    pub fn new(cloud: Arc<dyn ListenerApi>, rules: Arc<dyn RuleReconciler>) -> Self {
        Self { cloud, rules }
    }

    /// Compute what [`reconcile`](Self::reconcile) would do, without calling the provider
    pub fn plan(&self, request: &ReconcileRequest<'_>) -> Result<ListenerPlan> {
        let target = build_listener_config(request)?;

        let (listener_arn, change) = match Lifecycle::of(request) {
            Lifecycle::Create => (None, PlannedChange::Create),
            Lifecycle::UpdateIfDrifted(existing) => {
                let drift = DriftReport::evaluate(existing, &target);
                let change = if drift.has_drift() {
                    PlannedChange::Update { changed_fields: drift.changed_fields().to_vec() }
                } else {
                    PlannedChange::Unchanged
                };
                (Some(existing.listener_arn.clone()), change)
            }
        };

        Ok(ListenerPlan { port: request.port, listener_arn, change, target })
    }

    /// Converge one listener and its rules
    #[instrument(
        skip(self, ctx, request),
        fields(load_balancer_arn = %request.load_balancer_arn, port = request.port.port, protocol = %request.port.scheme)
    )]
    pub async fn reconcile(&self, ctx: &ReconcileContext, request: &ReconcileRequest<'_>) -> Result<Listener> {
        let target = build_listener_config(request)?;

        let listener = match Lifecycle::of(request) {
            Lifecycle::Create => self.create(ctx, request.load_balancer_arn, &target).await?,
            Lifecycle::UpdateIfDrifted(existing) => self.update_if_drifted(ctx, existing, &target).await?,
        };

        self.reconcile_rules(ctx, &listener, request).await?;
        Ok(listener)
    }

    async fn create(
        &self,
        ctx: &ReconcileContext,
        load_balancer_arn: &LoadBalancerArn,
        target: &TargetConfiguration,
    ) -> Result<Listener> {
        let span = crate::cloud_span!("create_listener", load_balancer_arn = %load_balancer_arn);
        let listener = ctx
            .guard("create_listener", self.cloud.create_listener(load_balancer_arn, target))
            .instrument(span)
            .await?
            .map_err(|source| Error::CreateFailed {
                load_balancer_arn: load_balancer_arn.to_string(),
                source,
            })?;

        info!(
            listener_arn = %listener.listener_arn,
            port = listener.port,
            protocol = %listener.protocol,
            "Created listener"
        );
        Ok(listener)
    }

    async fn update_if_drifted(
        &self,
        ctx: &ReconcileContext,
        existing: &Listener,
        target: &TargetConfiguration,
    ) -> Result<Listener> {
        let drift = DriftReport::evaluate(existing, target);
        if !drift.has_drift() {
            debug!(listener_arn = %existing.listener_arn, "Listener already converged");
            return Ok(existing.clone());
        }

        let span = crate::cloud_span!("modify_listener", listener_arn = %existing.listener_arn);
        let listener = ctx
            .guard("modify_listener", self.cloud.modify_listener(&existing.listener_arn, target))
            .instrument(span)
            .await?
            .map_err(|source| Error::UpdateFailed {
                listener_arn: existing.listener_arn.to_string(),
                source,
            })?;

        info!(
            listener_arn = %listener.listener_arn,
            port = listener.port,
            protocol = %listener.protocol,
            changed_fields = %drift,
            "Modified listener"
        );
        Ok(listener)
    }

    async fn reconcile_rules(
        &self,
        ctx: &ReconcileContext,
        listener: &Listener,
        request: &ReconcileRequest<'_>,
    ) -> Result<()> {
        let outcome = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(Error::cancelled("reconcile_rules")),
            result = self.rules.reconcile(listener, request.ingress, request.annotations, request.target_groups) => Ok(result),
        };

        let error = match outcome {
            Ok(Ok(result)) => {
                debug!(
                    listener_arn = %listener.listener_arn,
                    rules_created = result.rules_created,
                    rules_removed = result.rules_removed,
                    "Rules converged"
                );
                return Ok(());
            }
            Ok(Err(source)) => {
                Error::RuleReconciliation { listener_arn: listener.listener_arn.to_string(), source }
            }
            Err(cancelled) => cancelled,
        };

        warn!(
            listener_arn = %listener.listener_arn,
            error = %error,
            "Rule reconciliation failed; listener changes are kept"
        );
        Err(error)
    }
}
