//! Listener reconciliation commands
//!
//! Each handler returns a serializable report; `run_cli` prints it.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

use super::manifest::{load_ingress, load_target_groups, StateFile};
use crate::annotations::IngressAnnotations;
use crate::cloud::{InMemoryListenerApi, ListenerApi};
use crate::config::AppConfig;
use crate::domain::{CertificateArn, Ingress, Listener, LoadBalancerArn, PortData, TargetGroupIndex};
use crate::rules::InMemoryRuleReconciler;
use crate::services::{ListenerPlan, ListenerReconciler, ReconcileContext, ReconcileRequest};

/// Inputs shared by `plan` and `reconcile`
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Ingress manifest (YAML)
    #[arg(long, value_name = "FILE")]
    pub ingress: PathBuf,

    /// Resolved target groups (YAML or JSON list)
    #[arg(long, value_name = "FILE")]
    pub target_groups: PathBuf,

    /// Load balancer owning the listeners
    #[arg(long, value_name = "ARN")]
    pub load_balancer_arn: String,

    /// Provider state file (JSON); created on first reconcile
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short, long, default_value = "json", value_parser = ["json", "yaml"])]
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub ingress: String,
    pub listen_ports: Vec<PortData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<CertificateArn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,
    pub custom_actions: usize,
    pub backends: usize,
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub ingress: String,
    pub load_balancer_arn: LoadBalancerArn,
    pub listeners: Vec<ListenerPlan>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileReport {
    pub ingress: String,
    pub load_balancer_arn: LoadBalancerArn,
    pub listeners: Vec<Listener>,
}

/// Parse a manifest and its annotations
pub fn handle_validate(ingress_path: &Path, config: &AppConfig) -> Result<ValidateReport> {
    let ingress = load_ingress(ingress_path)?;
    let annotations = parse_annotations(&ingress, config)?;

    Ok(ValidateReport {
        ingress: ingress.key(),
        listen_ports: annotations.listen_ports.clone(),
        certificate_arn: annotations.listener.certificate_arn.clone(),
        ssl_policy: annotations.listener.ssl_policy.clone(),
        custom_actions: annotations.actions.len(),
        backends: ingress.backends().count(),
    })
}

/// Compute the change for every listen port without touching state
pub async fn handle_plan(args: &TargetArgs, config: &AppConfig) -> Result<PlanReport> {
    let inputs = Inputs::load(args, config)?;
    let state = load_state(args)?;
    let (cloud, rules) = state.into_providers();
    let existing = cloud
        .describe_listeners(&inputs.load_balancer_arn)
        .await
        .context("Failed to describe listeners")?;

    let reconciler = ListenerReconciler::new(Arc::new(cloud), Arc::new(rules));
    let mut plans = Vec::with_capacity(inputs.annotations.listen_ports.len());
    for port in &inputs.annotations.listen_ports {
        let request = inputs.request(*port, &existing);
        let plan = reconciler
            .plan(&request)
            .with_context(|| format!("Failed to plan listener {}", port))?;
        plans.push(plan);
    }

    Ok(PlanReport {
        ingress: inputs.ingress.key(),
        load_balancer_arn: inputs.load_balancer_arn,
        listeners: plans,
    })
}

/// Converge every listen port, then persist provider state.
///
/// State is saved even when a port fails, since earlier ports may already
/// have been mutated.
pub async fn handle_reconcile(
    args: &TargetArgs,
    config: &AppConfig,
    cancellation: CancellationToken,
) -> Result<ReconcileReport> {
    let inputs = Inputs::load(args, config)?;
    let state = load_state(args)?;
    let (cloud, rules) = state.into_providers();
    let cloud = Arc::new(cloud);
    let rules = Arc::new(rules);

    let existing = cloud
        .describe_listeners(&inputs.load_balancer_arn)
        .await
        .context("Failed to describe listeners")?;

    let reconciler = ListenerReconciler::new(cloud.clone(), rules.clone());
    let ctx = ReconcileContext::from_config(&config.reconciler, cancellation);

    let mut listeners = Vec::with_capacity(inputs.annotations.listen_ports.len());
    let mut failure = None;
    for port in &inputs.annotations.listen_ports {
        let request = inputs.request(*port, &existing);
        let span = crate::reconcile_span!(inputs.ingress.key(), port.port);
        match reconciler.reconcile(&ctx, &request).instrument(span).await {
            Ok(listener) => listeners.push(listener),
            Err(e) => {
                error!(port = port.port, error = %e, kind = %e.kind(), "Listener reconciliation failed");
                failure = Some((*port, e));
                break;
            }
        }
    }

    save_state(args, &cloud, &rules).await?;

    if let Some((port, e)) = failure {
        return Err(anyhow::Error::new(e).context(format!("Failed to reconcile listener {}", port)));
    }

    info!(listeners = listeners.len(), "Reconciliation complete");
    Ok(ReconcileReport {
        ingress: inputs.ingress.key(),
        load_balancer_arn: inputs.load_balancer_arn,
        listeners,
    })
}

struct Inputs {
    ingress: Ingress,
    annotations: IngressAnnotations,
    target_groups: TargetGroupIndex,
    load_balancer_arn: LoadBalancerArn,
}

impl Inputs {
    fn load(args: &TargetArgs, config: &AppConfig) -> Result<Self> {
        let ingress = load_ingress(&args.ingress)?;
        let annotations = parse_annotations(&ingress, config)?;
        let target_groups = load_target_groups(&args.target_groups)?;
        let load_balancer_arn =
            LoadBalancerArn::parse(&args.load_balancer_arn).context("Invalid --load-balancer-arn")?;
        Ok(Self { ingress, annotations, target_groups, load_balancer_arn })
    }

    /// Request for one port; a live listener on the same port is updated
    fn request<'a>(&'a self, port: PortData, existing: &'a [Listener]) -> ReconcileRequest<'a> {
        ReconcileRequest::new(
            &self.load_balancer_arn,
            &self.ingress,
            &self.annotations,
            port,
            &self.target_groups,
        )
        .with_existing(existing.iter().find(|listener| listener.port == port.port))
    }
}

fn parse_annotations(ingress: &Ingress, config: &AppConfig) -> Result<IngressAnnotations> {
    IngressAnnotations::from_ingress(ingress, &config.reconciler.annotation_prefix)
        .with_context(|| format!("Invalid annotations on ingress {}", ingress.key()))
}

fn load_state(args: &TargetArgs) -> Result<StateFile> {
    match &args.state {
        Some(path) => StateFile::load(path),
        None => Ok(StateFile::default()),
    }
}

async fn save_state(
    args: &TargetArgs,
    cloud: &InMemoryListenerApi,
    rules: &InMemoryRuleReconciler,
) -> Result<()> {
    if let Some(path) = &args.state {
        StateFile::capture(cloud, rules).await.save(path)?;
    }
    Ok(())
}
