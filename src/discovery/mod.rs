//! Discovery of a reachable join list from SRV records.

use crate::{
    order::order_srv_records,
    probe::{probe_endpoints, Prober, TcpProber},
    resolver::SrvResolver,
    Endpoint, InvalidRecordFormat, SrvName, SrvRecord,
};
use futures_util::future::try_join_all;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{collections::HashSet, fmt, time::Duration};

mod config;
pub use config::{DiscoveryConfig, DEFAULT_PROBE_TIMEOUT, DEFAULT_RESOLVE_TIMEOUT};

/// Errors that abort a discovery run.
///
/// Unreachable candidates are not errors; they are only absent from the
/// resulting [`JoinList`].
#[derive(Debug, thiserror::Error)]
pub enum Error<Lookup: std::error::Error + 'static> {
    /// A SRV name was not of the form `_service._proto.domain`
    #[error(transparent)]
    InvalidRecordFormat(#[from] InvalidRecordFormat),
    /// SRV lookup errors
    #[error("SRV lookup of {name} failed")]
    Resolution {
        /// The name being looked up.
        name: SrvName,
        /// The resolver's error.
        #[source]
        source: Lookup,
    },
    /// A SRV lookup did not finish in time
    #[error("SRV lookup of {name} timed out after {timeout:?}")]
    ResolutionTimeout {
        /// The name being looked up.
        name: SrvName,
        /// The configured lookup timeout.
        timeout: Duration,
    },
}

/// Reachable endpoints in preference order.
///
/// Displays as the comma-separated `host:port` list expected by a node's
/// `--join` flag, or an empty string when nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinList(Vec<Endpoint>);

impl JoinList {
    /// The endpoints, most preferred first.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.0
    }

    /// Number of endpoints found.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no endpoint was reachable. This is a normal outcome, e.g.
    /// for the first node of a new cluster.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JoinList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, endpoint) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(endpoint.as_str())?;
        }
        Ok(())
    }
}

impl From<JoinList> for Vec<Endpoint> {
    fn from(list: JoinList) -> Self {
        list.0
    }
}

impl IntoIterator for JoinList {
    type Item = Endpoint;
    type IntoIter = std::vec::IntoIter<Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Resolves SRV names into a bounded, reachability-confirmed join list.
///
/// # Usage
///
/// Candidates from every name are merged, ordered per RFC 2782 (priority
/// ascending, weighted random within a priority) and probed in that order
/// until `max` of them accept a connection.
///
/// ## DNS Resolvers
///
/// Lookups go through any [`SrvResolver`]; [`Discovery::from_system_conf`]
/// builds one from the host's resolver configuration.
///
/// ## Probing
///
/// Connection attempts go through a [`Prober`], by default a [`TcpProber`]
/// using the configured probe timeout.
#[derive(Debug)]
pub struct Discovery<Resolver, P = TcpProber> {
    resolver: Resolver,
    prober: P,
    config: DiscoveryConfig,
}

#[cfg(feature = "hickory")]
impl Discovery<hickory_resolver::TokioResolver, TcpProber> {
    /// Creates a discovery using the system's DNS configuration.
    pub fn from_system_conf(
        config: DiscoveryConfig,
    ) -> Result<Self, hickory_resolver::ResolveError> {
        let resolver = hickory_resolver::Resolver::builder_tokio()?.build();
        Ok(Self::new(resolver, config))
    }
}

impl<Resolver> Discovery<Resolver, TcpProber> {
    /// Creates a discovery that probes candidates over TCP.
    pub fn new(resolver: Resolver, config: DiscoveryConfig) -> Self {
        let prober = TcpProber::new(config.get_probe_timeout());
        Self::new_with_prober(resolver, prober, config)
    }
}

impl<Resolver, P> Discovery<Resolver, P> {
    /// Creates a discovery with a custom [`Prober`].
    ///
    /// The prober brings its own connection timeout; the config's
    /// [`probe_timeout`](DiscoveryConfig::probe_timeout) is not applied to it.
    pub fn new_with_prober(resolver: Resolver, prober: P, config: DiscoveryConfig) -> Self {
        Self {
            resolver,
            prober,
            config,
        }
    }

    /// Sets the prober of the discovery. As with
    /// [`new_with_prober`](Self::new_with_prober), the config's probe timeout
    /// does not apply to it.
    pub fn prober<Q: Prober>(self, prober: Q) -> Discovery<Resolver, Q> {
        Discovery {
            prober,
            resolver: self.resolver,
            config: self.config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }
}

impl<Resolver: SrvResolver, P: Prober> Discovery<Resolver, P> {
    /// Finds up to `max` reachable nodes located by the SRV `names`.
    ///
    /// Fails without probing anything if a name is malformed or any lookup
    /// fails. Succeeds with an empty list when no candidate is reachable or
    /// `max` is 0.
    pub async fn find_nodes<S: AsRef<str>>(
        &self,
        names: &[S],
        max: usize,
    ) -> Result<JoinList, Error<Resolver::Error>> {
        self.find_nodes_with_rng(names, max, &mut StdRng::from_os_rng())
            .await
    }

    /// Same as [`find_nodes`](Self::find_nodes), drawing the weighted
    /// shuffle from `rng`.
    pub async fn find_nodes_with_rng<S: AsRef<str>, G: Rng + Send>(
        &self,
        names: &[S],
        max: usize,
        rng: &mut G,
    ) -> Result<JoinList, Error<Resolver::Error>> {
        let names = names
            .iter()
            .map(|name| SrvName::parse(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let records = self.resolve_all(&names).await?;
        #[cfg(feature = "log")]
        tracing::debug!(candidates = records.len(), "merged SRV candidates");

        let mut endpoints: Vec<Endpoint> = order_srv_records(records, rng)
            .iter()
            .map(|record| record.endpoint())
            .collect();

        if self.config.get_dedup_endpoints() {
            let mut seen = HashSet::new();
            endpoints.retain(|endpoint| seen.insert(endpoint.clone()));
        }

        let reachable = probe_endpoints(
            &self.prober,
            &endpoints,
            max,
            self.config.get_probe_window(),
        )
        .await;

        #[cfg(feature = "log")]
        tracing::info!(found = reachable.len(), max, "discovery finished");
        Ok(JoinList(reachable))
    }

    async fn resolve_all(
        &self,
        names: &[SrvName],
    ) -> Result<Vec<Resolver::Record>, Error<Resolver::Error>> {
        if self.config.get_parallel_resolution() {
            let lookups = try_join_all(names.iter().map(|name| self.resolve(name))).await?;
            return Ok(lookups.into_iter().flatten().collect());
        }

        let mut records = Vec::new();
        for name in names {
            records.extend(self.resolve(name).await?);
        }
        Ok(records)
    }

    async fn resolve(
        &self,
        name: &SrvName,
    ) -> Result<Vec<Resolver::Record>, Error<Resolver::Error>> {
        let lookup = self.resolver.get_srv_records_unordered(name);
        let result = match self.config.get_resolve_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, lookup).await.map_err(|_| {
                Error::<Resolver::Error>::ResolutionTimeout {
                    name: name.clone(),
                    timeout,
                }
            })?,
            None => lookup.await,
        };

        match result {
            Ok(records) => {
                #[cfg(feature = "log")]
                tracing::debug!(srv = %name, records = records.len(), "SRV lookup succeeded");
                Ok(records)
            }
            Err(source) => {
                #[cfg(feature = "log")]
                tracing::debug!(srv = %name, error = %source, "SRV lookup failed");
                Err(Error::Resolution {
                    name: name.clone(),
                    source,
                })
            }
        }
    }
}
