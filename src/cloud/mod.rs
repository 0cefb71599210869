//! # Cloud Listener API
//!
//! The provider operations listener reconciliation consumes. Retries and
//! throttling belong to implementations of [`ListenerApi`]; callers issue
//! each mutation at most once per reconciliation.

pub mod error;
pub mod memory;

use async_trait::async_trait;

use crate::domain::{Listener, ListenerArn, LoadBalancerArn, TargetConfiguration};

pub use error::CloudError;
pub use memory::{InMemoryListenerApi, ListenerSnapshot};

/// Result type for provider calls
pub type CloudResult<T> = std::result::Result<T, CloudError>;

/// Listener operations of a load balancer provider
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait ListenerApi: Send + Sync + std::fmt::Debug {
    /// Create a listener on a load balancer; the provider assigns its ARN
    async fn create_listener(
        &self,
        load_balancer_arn: &LoadBalancerArn,
        config: &TargetConfiguration,
    ) -> CloudResult<Listener>;

    /// Replace port, protocol, TLS material and default actions of a listener
    async fn modify_listener(
        &self,
        listener_arn: &ListenerArn,
        config: &TargetConfiguration,
    ) -> CloudResult<Listener>;

    /// List the listeners attached to a load balancer
    async fn describe_listeners(&self, load_balancer_arn: &LoadBalancerArn) -> CloudResult<Vec<Listener>>;
}
