//! Business logic services
//!
//! Listener reconciliation, leaf-first:
//!
//! - `action_resolver`: backend reference → ordered routing actions
//! - `listener_config`: request → immutable [`TargetConfiguration`](crate::domain::TargetConfiguration)
//! - `drift`: field-wise comparison of desired and observed listeners
//! - `listener_reconciler`: create-or-update lifecycle, then rule convergence

pub mod action_resolver;
pub mod drift;
pub mod listener_config;
pub mod listener_reconciler;
pub mod request;

pub use action_resolver::{resolve_backend_actions, resolve_default_actions};
pub use drift::{needs_update, DriftReport, ListenerField};
pub use listener_config::build_listener_config;
pub use listener_reconciler::{ListenerPlan, ListenerReconciler, PlannedChange, ReconcileContext};
pub use request::ReconcileRequest;
