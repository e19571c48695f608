//! SRV records and the endpoints derived from them.

use std::{fmt::Display, net::Ipv6Addr};

/// Representation of types that contain the fields of a SRV record.
pub trait SrvRecord {
    /// Type representing the SRV record's target. Must implement `Display` so
    /// it can be used to create an [`Endpoint`].
    type Target: Display + ?Sized;

    /// Gets a SRV record's target.
    fn target(&self) -> &Self::Target;

    /// Gets a SRV record's port.
    fn port(&self) -> u16;

    /// Gets a SRV record's priority.
    fn priority(&self) -> u16;

    /// Gets a SRV record's weight.
    fn weight(&self) -> u16;

    /// Formats a SRV record's target and port as a `host:port` endpoint.
    fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.target().to_string(), self.port())
    }
}

/// An owned SRV record, independent of any resolver backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvCandidate {
    /// Target host name.
    pub target: String,
    /// Target port.
    pub port: u16,
    /// Lower values are preferred.
    pub priority: u16,
    /// Relative preference among records sharing a priority.
    pub weight: u16,
}

impl SrvCandidate {
    /// Creates a candidate from its parts.
    pub fn new(target: impl ToString, port: u16, priority: u16, weight: u16) -> Self {
        Self {
            target: target.to_string(),
            port,
            priority,
            weight,
        }
    }

    /// Copies the fields of any [`SrvRecord`] into an owned candidate.
    pub fn from_record(record: &impl SrvRecord) -> Self {
        Self::new(
            record.target(),
            record.port(),
            record.priority(),
            record.weight(),
        )
    }
}

impl SrvRecord for SrvCandidate {
    type Target = str;

    fn target(&self) -> &Self::Target {
        &self.target
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn priority(&self) -> u16 {
        self.priority
    }

    fn weight(&self) -> u16 {
        self.weight
    }
}

/// A `host:port` string identifying a candidate node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint(String);

impl Endpoint {
    /// Builds an endpoint from a host and port.
    ///
    /// The DNS root label (a trailing `.`) is dropped from the host, and IPv6
    /// literals are bracketed so the result stays parseable as `host:port`.
    pub fn new(host: &str, port: u16) -> Self {
        let host = host.strip_suffix('.').unwrap_or(host);
        if host.parse::<Ipv6Addr>().is_ok() {
            Self(format!("[{host}]:{port}"))
        } else {
            Self(format!("{host}:{port}"))
        }
    }

    /// The endpoint as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_root_label() {
        let candidate = SrvCandidate::new("h1.cockroachdb.default.svc.", 26257, 0, 10);
        assert_eq!(
            candidate.endpoint().as_str(),
            "h1.cockroachdb.default.svc:26257"
        );
    }

    #[test]
    fn endpoint_relative_host() {
        assert_eq!(Endpoint::new("h1", 26257).to_string(), "h1:26257");
    }

    #[test]
    fn endpoint_brackets_ipv6() {
        assert_eq!(Endpoint::new("::1", 8080).as_str(), "[::1]:8080");
        assert_eq!(Endpoint::new("10.0.0.1", 8080).as_str(), "10.0.0.1:8080");
    }

    #[test]
    fn candidate_from_record() {
        let original = SrvCandidate::new("h2.", 1, 2, 3);
        assert_eq!(SrvCandidate::from_record(&original), original);
    }

    #[test]
    fn endpoint_as_string() {
        let endpoint = Endpoint::new("h1.", 26257);
        let as_ref: &str = endpoint.as_ref();
        assert_eq!(as_ref, "h1:26257");
        assert_eq!(String::from(endpoint), "h1:26257");
    }
}
