//! Routing action domain types
//!
//! A listener's default behavior is an ordered chain of routing actions.
//! The set of action kinds is closed, so it is modelled as an enum rather
//! than a trait hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::TargetGroupArn;

/// One instruction in a listener's default-behavior chain.
///
/// Order matters when the provider evaluates actions sequentially: an
/// authenticate action must precede the forward it guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RoutingAction {
    /// Forward to a resolved target group
    Forward { target_group_arn: TargetGroupArn },

    /// Answer directly with a static response
    FixedResponse(FixedResponseConfig),

    /// Redirect the client to another URL
    Redirect(RedirectConfig),

    /// Authenticate the caller before the next action runs
    Authenticate(AuthenticateConfig),
}

impl RoutingAction {
    /// Create a forward action
    pub fn forward(target_group_arn: impl Into<TargetGroupArn>) -> Self {
        RoutingAction::Forward { target_group_arn: target_group_arn.into() }
    }

    /// Create a fixed response with only a status code
    pub fn fixed_response(status_code: u16) -> Self {
        RoutingAction::FixedResponse(FixedResponseConfig {
            status_code,
            content_type: None,
            message_body: None,
        })
    }

    /// The built-in "no route configured" response
    pub fn default_404() -> Self {
        RoutingAction::FixedResponse(FixedResponseConfig {
            status_code: 404,
            content_type: Some("text/plain".to_string()),
            message_body: None,
        })
    }

    /// Provider name of the action type
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingAction::Forward { .. } => "forward",
            RoutingAction::FixedResponse(_) => "fixed-response",
            RoutingAction::Redirect(_) => "redirect",
            RoutingAction::Authenticate(config) => match config.provider {
                AuthProvider::Oidc { .. } => "authenticate-oidc",
                AuthProvider::Cognito { .. } => "authenticate-cognito",
            },
        }
    }

    /// Target group this action routes into, if it is a forward
    pub fn target_group_arn(&self) -> Option<&TargetGroupArn> {
        match self {
            RoutingAction::Forward { target_group_arn } => Some(target_group_arn),
            _ => None,
        }
    }

    /// Whether the action ends the chain (anything except authenticate)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoutingAction::Authenticate(_))
    }
}

impl fmt::Display for RoutingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingAction::Forward { target_group_arn } => write!(f, "forward({})", target_group_arn),
            RoutingAction::FixedResponse(config) => {
                write!(f, "fixed-response({})", config.status_code)
            }
            RoutingAction::Redirect(config) => write!(f, "redirect({})", config.status_code),
            other => f.write_str(other.kind()),
        }
    }
}

/// Static response returned by the load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedResponseConfig {
    /// HTTP status code (2XX, 4XX or 5XX)
    pub status_code: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_body: Option<String>,
}

/// Redirect target. Unset components keep the original request's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    pub status_code: RedirectStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Redirect response code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectStatus {
    #[serde(rename = "HTTP_301")]
    Permanent,

    #[serde(rename = "HTTP_302")]
    Temporary,
}

impl RedirectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectStatus::Permanent => "HTTP_301",
            RedirectStatus::Temporary => "HTTP_302",
        }
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication performed by the load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateConfig {
    pub provider: AuthProvider,

    #[serde(default)]
    pub on_unauthenticated_request: UnauthenticatedAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_timeout_seconds: Option<u64>,
}

/// Identity provider backing an authenticate action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthProvider {
    Oidc {
        issuer: String,
        authorization_endpoint: String,
        token_endpoint: String,
        user_info_endpoint: String,
        client_id: String,
    },
    Cognito {
        user_pool_arn: String,
        user_pool_client_id: String,
        user_pool_domain: String,
    },
}

/// Behavior when the request carries no authenticated session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthenticatedAction {
    Deny,
    Allow,
    #[default]
    Authenticate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_exposes_target_group() {
        let action = RoutingAction::forward("tg-1");
        assert_eq!(action.kind(), "forward");
        assert_eq!(action.target_group_arn().map(|arn| arn.as_str()), Some("tg-1"));
        assert!(action.is_terminal());
        assert_eq!(action.to_string(), "forward(tg-1)");
    }

    #[test]
    fn default_404_is_fixed_response() {
        match RoutingAction::default_404() {
            RoutingAction::FixedResponse(config) => {
                assert_eq!(config.status_code, 404);
                assert_eq!(config.content_type.as_deref(), Some("text/plain"));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn authenticate_is_not_terminal() {
        let action = RoutingAction::Authenticate(AuthenticateConfig {
            provider: AuthProvider::Cognito {
                user_pool_arn: "pool".into(),
                user_pool_client_id: "client".into(),
                user_pool_domain: "domain".into(),
            },
            on_unauthenticated_request: UnauthenticatedAction::default(),
            scope: None,
            session_cookie_name: None,
            session_timeout_seconds: None,
        });
        assert!(!action.is_terminal());
        assert_eq!(action.kind(), "authenticate-cognito");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(RoutingAction::forward("tg-1")).unwrap();
        assert_eq!(json["type"], "forward");
        assert_eq!(json["target_group_arn"], "tg-1");

        let redirect = RoutingAction::Redirect(RedirectConfig {
            status_code: RedirectStatus::Permanent,
            protocol: Some("HTTPS".into()),
            host: None,
            port: Some("443".into()),
            path: None,
            query: None,
        });
        let json = serde_json::to_value(&redirect).unwrap();
        assert_eq!(json["type"], "redirect");
        assert_eq!(json["status_code"], "HTTP_301");

        let back: RoutingAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, redirect);
    }
}
