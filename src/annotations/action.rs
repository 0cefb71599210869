//! Custom action annotations (`actions.<backend-name>`)
//!
//! Each annotation holds one action in the provider's JSON shape, e.g.
//!
//! ```json
//! {"Type": "fixed-response",
//!  "FixedResponseConfig": {"ContentType": "text/plain", "StatusCode": "503", "MessageBody": "down"}}
//! ```
//!
//! A backend whose port is `use-annotation` is routed through the action
//! stored under its service name.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::annotation_key;
use crate::domain::{
    AuthProvider, AuthenticateConfig, FixedResponseConfig, RedirectConfig, RedirectStatus,
    RoutingAction, TargetGroupArn, UnauthenticatedAction, DEFAULT_404_SERVICE,
};
use crate::errors::{Error, Result};

const ACTIONS_PREFIX: &str = "actions.";
const MAX_MESSAGE_BODY_LEN: usize = 1024;

/// Custom actions keyed by backend service name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionAnnotations {
    actions: BTreeMap<String, RoutingAction>,
}

impl ActionAnnotations {
    pub fn parse(annotations: &BTreeMap<String, String>, prefix: &str) -> Result<Self> {
        let key_prefix = annotation_key(prefix, ACTIONS_PREFIX);
        let mut actions = BTreeMap::new();

        for (key, value) in annotations {
            let Some(name) = key.strip_prefix(&key_prefix) else {
                continue;
            };
            if name.is_empty() {
                return Err(Error::validation_field("action annotation has no backend name", key));
            }
            let document: ActionDocument = serde_json::from_str(value).map_err(|e| {
                Error::validation_field(format!("action is not valid JSON: {}", e), key)
            })?;
            let action = document
                .into_action()
                .map_err(|message| Error::validation_field(message, key))?;
            actions.insert(name.to_string(), action);
        }

        Ok(Self { actions })
    }

    /// Action for a `use-annotation` backend.
    ///
    /// The fallback `response-404` backend resolves to a built-in 404 response
    /// unless an annotation overrides it.
    pub fn get(&self, backend_name: &str) -> Result<RoutingAction> {
        if let Some(action) = self.actions.get(backend_name) {
            return Ok(action.clone());
        }
        if backend_name == DEFAULT_404_SERVICE {
            return Ok(RoutingAction::default_404());
        }
        Err(Error::annotation_resolution(
            backend_name,
            format!("no `{}{}` annotation is declared", ACTIONS_PREFIX, backend_name),
        ))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ActionDocument {
    #[serde(rename = "Type")]
    action_type: String,
    target_group_arn: Option<String>,
    fixed_response_config: Option<FixedResponseDocument>,
    redirect_config: Option<RedirectDocument>,
    authenticate_oidc_config: Option<OidcDocument>,
    authenticate_cognito_config: Option<CognitoDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FixedResponseDocument {
    content_type: Option<String>,
    message_body: Option<String>,
    status_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RedirectDocument {
    host: Option<String>,
    path: Option<String>,
    port: Option<String>,
    protocol: Option<String>,
    query: Option<String>,
    status_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SessionDocument {
    on_unauthenticated_request: Option<String>,
    scope: Option<String>,
    session_cookie_name: Option<String>,
    session_timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OidcDocument {
    issuer: String,
    authorization_endpoint: String,
    token_endpoint: String,
    user_info_endpoint: String,
    client_id: String,
    #[serde(flatten)]
    session: SessionDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CognitoDocument {
    user_pool_arn: String,
    user_pool_client_id: String,
    user_pool_domain: String,
    #[serde(flatten)]
    session: SessionDocument,
}

impl ActionDocument {
    fn into_action(self) -> std::result::Result<RoutingAction, String> {
        match self.action_type.as_str() {
            "forward" => {
                let arn = self.target_group_arn.ok_or("forward action requires TargetGroupArn")?;
                let arn = TargetGroupArn::parse(&arn).map_err(|e| e.to_string())?;
                Ok(RoutingAction::Forward { target_group_arn: arn })
            }
            "fixed-response" => {
                let config = self
                    .fixed_response_config
                    .ok_or("fixed-response action requires FixedResponseConfig")?;
                Ok(RoutingAction::FixedResponse(config.into_config()?))
            }
            "redirect" => {
                let config = self.redirect_config.ok_or("redirect action requires RedirectConfig")?;
                Ok(RoutingAction::Redirect(config.into_config()?))
            }
            "authenticate-oidc" => {
                let oidc = self
                    .authenticate_oidc_config
                    .ok_or("authenticate-oidc action requires AuthenticateOidcConfig")?;
                let provider = AuthProvider::Oidc {
                    issuer: oidc.issuer,
                    authorization_endpoint: oidc.authorization_endpoint,
                    token_endpoint: oidc.token_endpoint,
                    user_info_endpoint: oidc.user_info_endpoint,
                    client_id: oidc.client_id,
                };
                Ok(RoutingAction::Authenticate(oidc.session.into_config(provider)?))
            }
            "authenticate-cognito" => {
                let cognito = self
                    .authenticate_cognito_config
                    .ok_or("authenticate-cognito action requires AuthenticateCognitoConfig")?;
                let provider = AuthProvider::Cognito {
                    user_pool_arn: cognito.user_pool_arn,
                    user_pool_client_id: cognito.user_pool_client_id,
                    user_pool_domain: cognito.user_pool_domain,
                };
                Ok(RoutingAction::Authenticate(cognito.session.into_config(provider)?))
            }
            other => Err(format!("unknown action type '{}'", other)),
        }
    }
}

impl FixedResponseDocument {
    fn into_config(self) -> std::result::Result<FixedResponseConfig, String> {
        let status_code: u16 = self
            .status_code
            .parse()
            .map_err(|_| format!("status code '{}' is not a number", self.status_code))?;
        if !matches!(status_code, 200..=299 | 400..=599) {
            return Err(format!("fixed-response status code {} must be 2XX, 4XX or 5XX", status_code));
        }
        if self.message_body.as_ref().is_some_and(|b| b.len() > MAX_MESSAGE_BODY_LEN) {
            return Err(format!("message body exceeds {} bytes", MAX_MESSAGE_BODY_LEN));
        }
        Ok(FixedResponseConfig {
            status_code,
            content_type: self.content_type,
            message_body: self.message_body,
        })
    }
}

impl RedirectDocument {
    fn into_config(self) -> std::result::Result<RedirectConfig, String> {
        let status_code = match self.status_code.as_str() {
            "HTTP_301" => RedirectStatus::Permanent,
            "HTTP_302" => RedirectStatus::Temporary,
            other => return Err(format!("redirect status code '{}' must be HTTP_301 or HTTP_302", other)),
        };
        Ok(RedirectConfig {
            status_code,
            protocol: self.protocol,
            host: self.host,
            port: self.port,
            path: self.path,
            query: self.query,
        })
    }
}

impl SessionDocument {
    fn into_config(self, provider: AuthProvider) -> std::result::Result<AuthenticateConfig, String> {
        let on_unauthenticated_request = match self.on_unauthenticated_request.as_deref() {
            None | Some("authenticate") => UnauthenticatedAction::Authenticate,
            Some("deny") => UnauthenticatedAction::Deny,
            Some("allow") => UnauthenticatedAction::Allow,
            Some(other) => return Err(format!("unknown OnUnauthenticatedRequest '{}'", other)),
        };
        Ok(AuthenticateConfig {
            provider,
            on_unauthenticated_request,
            scope: self.scope,
            session_cookie_name: self.session_cookie_name,
            session_timeout_seconds: self.session_timeout,
        })
    }
}
