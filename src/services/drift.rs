//! Drift Evaluator
//!
//! Compares the five convergence fields of an observed listener against the
//! desired configuration. Every field is checked on every evaluation; the
//! report lists all differing fields rather than the first one found.
//!
//! Comparison policy:
//! - certificates: order-insensitive, compared as sorted `(arn, is_default)` pairs
//! - default actions: order-sensitive, since the provider runs them in sequence
//! - SSL policy: strict equality of the optional value

use serde::Serialize;
use std::fmt;

use crate::domain::{Certificate, Listener, TargetConfiguration};

/// A listener field that participates in drift detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerField {
    Port,
    Protocol,
    Certificates,
    SslPolicy,
    DefaultActions,
}

impl ListenerField {
    pub const ALL: [ListenerField; 5] = [
        ListenerField::Port,
        ListenerField::Protocol,
        ListenerField::Certificates,
        ListenerField::SslPolicy,
        ListenerField::DefaultActions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerField::Port => "port",
            ListenerField::Protocol => "protocol",
            ListenerField::Certificates => "certificates",
            ListenerField::SslPolicy => "ssl_policy",
            ListenerField::DefaultActions => "default_actions",
        }
    }
}

impl fmt::Display for ListenerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields in which an observed listener differs from its target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    changed_fields: Vec<ListenerField>,
}

impl DriftReport {
    pub fn evaluate(observed: &Listener, target: &TargetConfiguration) -> Self {
        let checks = [
            (ListenerField::Port, observed.port != target.port()),
            (ListenerField::Protocol, observed.protocol != target.protocol()),
            (
                ListenerField::Certificates,
                !same_certificates(&observed.certificates, target.certificates()),
            ),
            (ListenerField::SslPolicy, observed.ssl_policy.as_deref() != target.ssl_policy()),
            (
                ListenerField::DefaultActions,
                observed.default_actions.as_slice() != target.default_actions(),
            ),
        ];

        Self {
            changed_fields: checks
                .into_iter()
                .filter_map(|(field, differs)| differs.then_some(field))
                .collect(),
        }
    }

    pub fn has_drift(&self) -> bool {
        !self.changed_fields.is_empty()
    }

    pub fn changed_fields(&self) -> &[ListenerField] {
        &self.changed_fields
    }

    pub fn contains(&self, field: ListenerField) -> bool {
        self.changed_fields.contains(&field)
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.changed_fields.iter().map(ListenerField::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Whether `observed` must be modified to match `target`
pub fn needs_update(observed: &Listener, target: &TargetConfiguration) -> bool {
    DriftReport::evaluate(observed, target).has_drift()
}

fn same_certificates(observed: &[Certificate], desired: &[Certificate]) -> bool {
    if observed.len() != desired.len() {
        return false;
    }
    let mut observed = observed.to_vec();
    let mut desired = desired.to_vec();
    observed.sort();
    desired.sort();
    observed == desired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CertificateArn, ListenerArn, LoadBalancerArn, PortData, Protocol, RoutingAction,
    };

    fn https_target(certs: Vec<Certificate>, policy: Option<&str>) -> TargetConfiguration {
        TargetConfiguration::new(PortData::new(443, Protocol::Https), vec![RoutingAction::forward("tg-1")])
            .unwrap()
            .with_tls(certs, policy.map(str::to_string))
            .unwrap()
    }

    fn observed_from(target: &TargetConfiguration) -> Listener {
        Listener::from_config(ListenerArn::new("ls-1"), LoadBalancerArn::new("lb-1"), target)
    }

    fn cert(arn: &str, is_default: bool) -> Certificate {
        Certificate { certificate_arn: CertificateArn::new(arn), is_default }
    }

    #[test]
    fn identical_listener_has_no_drift() {
        let target = https_target(vec![cert("cert-1", true)], Some("p1"));
        let report = DriftReport::evaluate(&observed_from(&target), &target);
        assert!(!report.has_drift());
        assert!(!needs_update(&observed_from(&target), &target));
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn port_change_is_drift() {
        let target =
            TargetConfiguration::new(PortData::http_default(), vec![RoutingAction::forward("tg-1")])
                .unwrap();
        let mut observed = observed_from(&target);
        observed.port = 8080;

        let report = DriftReport::evaluate(&observed, &target);
        assert_eq!(report.changed_fields(), &[ListenerField::Port]);
        assert!(needs_update(&observed, &target));
    }

    #[test]
    fn reports_every_differing_field() {
        let target = https_target(vec![cert("cert-1", true)], Some("p1"));
        let mut observed = observed_from(&target);
        observed.port = 8443;
        observed.protocol = Protocol::Http;
        observed.certificates.clear();
        observed.ssl_policy = None;
        observed.default_actions = vec![RoutingAction::default_404()];

        let report = DriftReport::evaluate(&observed, &target);
        assert_eq!(report.changed_fields(), &ListenerField::ALL);
        assert_eq!(
            report.to_string(),
            "port,protocol,certificates,ssl_policy,default_actions"
        );
    }

    #[test]
    fn certificate_order_is_ignored() {
        let target = https_target(vec![cert("cert-1", true), cert("cert-2", false)], None);
        let mut observed = observed_from(&target);
        observed.certificates.reverse();

        assert!(!needs_update(&observed, &target));
    }

    #[test]
    fn certificate_default_flag_matters() {
        let target = https_target(vec![cert("cert-1", true), cert("cert-2", false)], None);
        let mut observed = observed_from(&target);
        observed.certificates = vec![cert("cert-1", false), cert("cert-2", true)];

        assert!(DriftReport::evaluate(&observed, &target).contains(ListenerField::Certificates));
    }

    #[test]
    fn action_order_matters() {
        let target = TargetConfiguration::new(
            PortData::http_default(),
            vec![RoutingAction::fixed_response(503), RoutingAction::forward("tg-1")],
        )
        .unwrap();
        let mut observed = observed_from(&target);
        observed.default_actions.reverse();

        let report = DriftReport::evaluate(&observed, &target);
        assert_eq!(report.changed_fields(), &[ListenerField::DefaultActions]);
    }

    #[test]
    fn ssl_policy_presence_matters() {
        let target = https_target(vec![], None);
        let mut observed = observed_from(&target);
        observed.ssl_policy = Some("ELBSecurityPolicy-2016-08".to_string());

        assert!(DriftReport::evaluate(&observed, &target).contains(ListenerField::SslPolicy));
    }
}
