//! Domain layer
//!
//! This module contains pure domain entities with zero infrastructure
//! dependencies. Domain types represent the declarative input (ingress,
//! backends, target groups) and both sides of a listener diff (desired
//! [`TargetConfiguration`] and observed [`Listener`]).
//!
//! ## Module Organization
//!
//! - `id`: Type-safe provider identifiers with NewType pattern
//! - `action`: Routing actions forming a listener's default behavior
//! - `backend`: Backend references and the `use-annotation` convention
//! - `ingress`: Route specification (default backend, host/path rules)
//! - `listener`: Protocol, port descriptor, certificates, desired/observed listener
//! - `target_group`: Precomputed backend → target group index

pub mod action;
pub mod backend;
pub mod id;
pub mod ingress;
pub mod listener;
pub mod target_group;

pub use action::{
    AuthProvider, AuthenticateConfig, FixedResponseConfig, RedirectConfig, RedirectStatus,
    RoutingAction, UnauthenticatedAction,
};
pub use backend::{IngressBackend, ServicePort, DEFAULT_404_SERVICE, USE_ANNOTATION_PORT};
pub use id::{CertificateArn, ListenerArn, LoadBalancerArn, TargetGroupArn};
pub use ingress::{HttpIngressPath, HttpIngressRuleValue, Ingress, IngressRule, IngressSpec, ObjectMeta};
pub use listener::{Certificate, Listener, PortData, Protocol, TargetConfiguration};
pub use target_group::{TargetGroupBinding, TargetGroupIndex};
