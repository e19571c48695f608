//! SRV query names.

use std::{fmt, str::FromStr};

/// Error produced when a string is not a `_service._proto.domain` SRV name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SRV record name {name:?}: {reason}")]
pub struct InvalidRecordFormat {
    name: String,
    reason: &'static str,
}

impl InvalidRecordFormat {
    fn new(name: &str, reason: &'static str) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }

    /// The rejected input.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A validated SRV query name of the form `_service._proto.domain`.
///
/// On Kubernetes the service label is usually the name of a named port,
/// e.g. `_grpc._tcp.cockroachdb.default.svc.cluster.local`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvName {
    query: String,
    service: String,
    proto: String,
    domain: String,
}

impl SrvName {
    /// Parses and decomposes a SRV query name.
    pub fn parse(raw: &str) -> Result<Self, InvalidRecordFormat> {
        if !raw.starts_with('_') {
            return Err(InvalidRecordFormat::new(raw, "must start with `_`"));
        }

        let mut labels = raw.splitn(3, '.');
        let (Some(service), Some(proto), Some(_)) = (labels.next(), labels.next(), labels.next())
        else {
            return Err(InvalidRecordFormat::new(
                raw,
                "expected at least three dot-separated labels",
            ));
        };

        let service = service.strip_prefix('_').unwrap_or(service);
        let proto = proto.strip_prefix('_').unwrap_or(proto);

        // Without the literal `_service._proto.` prefix nothing is stripped.
        let domain = raw
            .strip_prefix(&format!("_{service}._{proto}."))
            .unwrap_or(raw);

        Ok(Self {
            query: raw.to_string(),
            service: service.to_string(),
            proto: proto.to_string(),
            domain: domain.to_string(),
        })
    }

    /// The service label, without its leading underscore.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The protocol label, without its leading underscore.
    pub fn proto(&self) -> &str {
        &self.proto
    }

    /// Everything after the `_service._proto.` prefix, or the whole query
    /// when it does not carry that exact prefix.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl FromStr for SrvName {
    type Err = InvalidRecordFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SrvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}
