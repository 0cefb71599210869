//! # albsync
//!
//! Listener reconciliation for ingress-managed application load balancers.
//! Given an ingress-style route description, its annotations and the target
//! groups already resolved for its backends, albsync computes the desired
//! configuration of each listener and issues the minimal create or modify
//! call to converge the live listener.
//!
//! ## Architecture
//!
//! ```text
//! ListenerReconciler → build_listener_config → resolve_default_actions
//!        ↓                                            ↓
//!   DriftReport (if a listener exists)         AnnotationStore / TargetGroupIndex
//!        ↓
//!   ListenerApi (create | modify) → RuleReconciler
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use albsync::annotations::IngressAnnotations;
//! use albsync::cloud::InMemoryListenerApi;
//! use albsync::domain::{Ingress, LoadBalancerArn, PortData, TargetGroupIndex};
//! use albsync::rules::InMemoryRuleReconciler;
//! use albsync::services::{ListenerReconciler, ReconcileContext, ReconcileRequest};
//!
//! # async fn run(ingress: Ingress, target_groups: TargetGroupIndex) -> albsync::Result<()> {
//! let reconciler = ListenerReconciler::new(
//!     Arc::new(InMemoryListenerApi::new()),
//!     Arc::new(InMemoryRuleReconciler::new()),
//! );
//! let annotations = IngressAnnotations::from_ingress(&ingress, "alb.ingress.kubernetes.io")?;
//! let lb = LoadBalancerArn::new("arn:aws:elasticloadbalancing:us-east-1:123:loadbalancer/app/web/abc");
//! let request = ReconcileRequest::new(&lb, &ingress, &annotations, PortData::http_default(), &target_groups);
//! let listener = reconciler.reconcile(&ReconcileContext::default(), &request).await?;
//! # Ok(())
//! # }
//! ```

pub mod annotations;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod rules;
pub mod services;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, ErrorKind, Result};
pub use services::{ListenerReconciler, ReconcileContext, ReconcileRequest};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
