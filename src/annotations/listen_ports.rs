//! `listen-ports` annotation: the listeners an ingress asks for
//!
//! Format: `[{"HTTP": 80}, {"HTTPS": 443}]`. Absent means a single HTTP
//! listener on port 80.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{annotation_key, lookup};
use crate::domain::{PortData, Protocol};
use crate::errors::{Error, Result};

const LISTEN_PORTS: &str = "listen-ports";

/// One `{"<protocol>": <port>}` object, keys kept as written
struct ListenEntry(Vec<(String, u16)>);

impl<'de> Deserialize<'de> for ListenEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ListenEntryVisitor;

        impl<'de> Visitor<'de> for ListenEntryVisitor {
            type Value = ListenEntry;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an object mapping one protocol to a port")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs: Vec<(String, u16)> = Vec::with_capacity(1);
                while let Some((scheme, port)) = map.next_entry::<String, u16>()? {
                    if pairs.iter().any(|(seen, _)| *seen == scheme) {
                        return Err(de::Error::custom(format!("duplicate protocol '{}'", scheme)));
                    }
                    pairs.push((scheme, port));
                }
                Ok(ListenEntry(pairs))
            }
        }

        deserializer.deserialize_map(ListenEntryVisitor)
    }
}

pub fn parse_listen_ports(
    annotations: &BTreeMap<String, String>,
    prefix: &str,
) -> Result<Vec<PortData>> {
    let key = annotation_key(prefix, LISTEN_PORTS);
    let Some(raw) = lookup(annotations, prefix, LISTEN_PORTS) else {
        return Ok(vec![PortData::http_default()]);
    };

    let entries: Vec<ListenEntry> = serde_json::from_str(raw).map_err(|e| {
        Error::validation_field(format!("listen-ports is not valid JSON: {}", e), key.clone())
    })?;

    if entries.is_empty() {
        return Err(Error::validation_field("listen-ports must name at least one port", key));
    }

    let mut seen = BTreeSet::new();
    let mut ports = Vec::with_capacity(entries.len());
    for ListenEntry(entry) in entries {
        if entry.len() != 1 {
            return Err(Error::validation_field(
                "each listen-ports entry must map exactly one protocol to a port",
                key,
            ));
        }
        for (scheme, port) in entry {
            let scheme: Protocol = scheme
                .parse()
                .map_err(|_| Error::validation_field(format!("unsupported protocol '{}'", scheme), key.clone()))?;
            if port == 0 {
                return Err(Error::validation_field("listen port must not be 0", key));
            }
            if !seen.insert(port) {
                return Err(Error::validation_field(
                    format!("port {} is listed more than once", port),
                    key,
                ));
            }
            ports.push(PortData::new(port, scheme));
        }
    }
    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "alb.ingress.kubernetes.io";

    fn parse(value: &str) -> Result<Vec<PortData>> {
        let annotations = BTreeMap::from([(format!("{}/listen-ports", PREFIX), value.to_string())]);
        parse_listen_ports(&annotations, PREFIX)
    }

    #[test]
    fn defaults_to_http_80() {
        assert_eq!(
            parse_listen_ports(&BTreeMap::new(), PREFIX).unwrap(),
            vec![PortData::new(80, Protocol::Http)]
        );
    }

    #[test]
    fn parses_multiple_ports_in_order() {
        let ports = parse(r#"[{"HTTP": 80}, {"HTTPS": 443}]"#).unwrap();
        assert_eq!(
            ports,
            vec![PortData::new(80, Protocol::Http), PortData::new(443, Protocol::Https)]
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse("not json").is_err());
        assert!(parse("[]").is_err());
        assert!(parse(r#"[{"TCP": 22}]"#).is_err());
        assert!(parse(r#"[{"HTTP": 0}]"#).is_err());
        assert!(parse(r#"[{"HTTP": 80, "HTTPS": 443}]"#).is_err());
        assert!(parse(r#"[{"HTTP": 8080}, {"HTTPS": 8080}]"#).is_err());
        assert!(parse(r#"[{"HTTP": 80, "HTTP": 81}]"#).is_err());
        assert!(parse(r#"[{}]"#).is_err());
    }

    #[test]
    fn repeated_protocol_in_one_entry_is_named() {
        let err = parse(r#"[{"HTTP": 80, "HTTP": 81}]"#).unwrap_err();
        assert!(err.to_string().contains("duplicate protocol 'HTTP'"), "{err}");
    }
}
