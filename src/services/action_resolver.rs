//! Action Resolver
//!
//! Turns a backend reference into the ordered routing actions of a listener
//! or rule. A missing target group is never defaulted: target groups must be
//! resolved before listeners are reconciled, so a gap here is an upstream
//! ordering bug and surfaces as [`Error::UnresolvedBackend`].

use tracing::debug;

use crate::annotations::AnnotationStore;
use crate::domain::{IngressBackend, RoutingAction, TargetGroupIndex, DEFAULT_404_SERVICE};
use crate::errors::{Error, Result};

/// Resolve the default actions of a listener.
///
/// An absent default backend is replaced by the `response-404` fallback. A
/// store that declares no action for it yields the built-in 404 response, so
/// the result is never empty.
pub fn resolve_default_actions(
    default_backend: Option<&IngressBackend>,
    annotations: &dyn AnnotationStore,
    target_groups: &TargetGroupIndex,
) -> Result<Vec<RoutingAction>> {
    match default_backend {
        Some(backend) => resolve_backend_actions(backend, annotations, target_groups),
        None => Ok(vec![fallback_action(annotations)]),
    }
}

fn fallback_action(annotations: &dyn AnnotationStore) -> RoutingAction {
    match annotations.get_custom_action(DEFAULT_404_SERVICE) {
        Ok(action) => action,
        Err(error) => {
            debug!(error = %error, "No fallback action declared, using built-in 404");
            RoutingAction::default_404()
        }
    }
}

/// Resolve the actions of one backend
pub fn resolve_backend_actions(
    backend: &IngressBackend,
    annotations: &dyn AnnotationStore,
    target_groups: &TargetGroupIndex,
) -> Result<Vec<RoutingAction>> {
    if backend.uses_annotation() {
        let action = annotations.get_custom_action(&backend.service_name)?;
        return Ok(vec![action]);
    }

    let target_group_arn = target_groups
        .get(backend)
        .ok_or_else(|| Error::unresolved_backend(&backend.service_name, &backend.service_port))?;

    Ok(vec![RoutingAction::forward(target_group_arn.clone())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{IngressAnnotations, DEFAULT_ANNOTATION_PREFIX};
    use crate::errors::ErrorKind;
    use std::collections::BTreeMap;

    fn annotations_with(name: &str, document: &str) -> IngressAnnotations {
        let mut raw = BTreeMap::new();
        raw.insert(format!("{}/actions.{}", DEFAULT_ANNOTATION_PREFIX, name), document.to_string());
        IngressAnnotations::parse(&raw, DEFAULT_ANNOTATION_PREFIX).unwrap()
    }

    #[test]
    fn forwards_to_resolved_target_group() {
        let tgs = TargetGroupIndex::new().with(IngressBackend::new("svc-a", 8080), "tg-1");
        let actions = resolve_default_actions(
            Some(&IngressBackend::new("svc-a", 8080)),
            &IngressAnnotations::default(),
            &tgs,
        )
        .unwrap();

        assert_eq!(actions, vec![RoutingAction::forward("tg-1")]);
    }

    #[test]
    fn absent_backend_falls_back_to_404() {
        let actions =
            resolve_default_actions(None, &IngressAnnotations::default(), &TargetGroupIndex::new())
                .unwrap();
        assert_eq!(actions, vec![RoutingAction::default_404()]);
    }

    /// Store that declares no custom actions and no TLS settings
    struct EmptyStore;

    impl AnnotationStore for EmptyStore {
        fn get_custom_action(&self, backend_name: &str) -> Result<RoutingAction> {
            Err(Error::annotation_resolution(backend_name, "no actions declared"))
        }

        fn certificate_ref(&self) -> Option<&crate::domain::CertificateArn> {
            None
        }

        fn ssl_policy(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn absent_backend_falls_back_to_404_for_any_store() {
        let actions = resolve_default_actions(None, &EmptyStore, &TargetGroupIndex::new()).unwrap();
        assert_eq!(actions, vec![RoutingAction::default_404()]);
    }

    #[test]
    fn explicit_custom_backend_still_fails_on_empty_store() {
        let backend = IngressBackend::new("ssl-redirect", "use-annotation");
        let err =
            resolve_default_actions(Some(&backend), &EmptyStore, &TargetGroupIndex::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AnnotationResolutionFailure);
    }

    #[test]
    fn fallback_can_be_overridden_by_annotation() {
        let annotations = annotations_with(
            "response-404",
            r#"{"Type":"fixed-response","FixedResponseConfig":{"StatusCode":"503"}}"#,
        );
        let actions = resolve_default_actions(None, &annotations, &TargetGroupIndex::new()).unwrap();
        assert_eq!(actions, vec![RoutingAction::fixed_response(503)]);
    }

    #[test]
    fn use_annotation_backend_reads_custom_action() {
        let annotations = annotations_with(
            "ssl-redirect",
            r#"{"Type":"redirect","RedirectConfig":{"Protocol":"HTTPS","Port":"443","StatusCode":"HTTP_301"}}"#,
        );
        let backend = IngressBackend::new("ssl-redirect", "use-annotation");
        let actions =
            resolve_default_actions(Some(&backend), &annotations, &TargetGroupIndex::new()).unwrap();

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind(), "redirect");
    }

    #[test]
    fn missing_custom_action_is_annotation_failure() {
        let backend = IngressBackend::new("nothing-here", "use-annotation");
        let err = resolve_default_actions(
            Some(&backend),
            &IngressAnnotations::default(),
            &TargetGroupIndex::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AnnotationResolutionFailure);
    }

    #[test]
    fn unresolved_backend_names_service_and_port() {
        let tgs = TargetGroupIndex::new().with(IngressBackend::new("svc-a", 80), "tg-1");
        let err = resolve_default_actions(
            Some(&IngressBackend::new("svc-a", 8080)),
            &IngressAnnotations::default(),
            &tgs,
        )
        .unwrap_err();

        match err {
            Error::UnresolvedBackend { service_name, service_port } => {
                assert_eq!(service_name, "svc-a");
                assert_eq!(service_port, "8080");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
