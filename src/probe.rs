//! Reachability probing of candidate endpoints.

use crate::Endpoint;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use std::{num::NonZeroUsize, time::Duration};
use tokio::net::TcpStream;

/// Reasons a single endpoint could not be confirmed reachable.
///
/// These never abort a scan; the endpoint is simply left out of the result.
#[derive(Debug, thiserror::Error)]
pub enum ProbeFailure {
    /// Name resolution or connection establishment failed
    #[error("connecting: {0}")]
    Connect(#[from] std::io::Error),
    /// No connection was established within the probe timeout
    #[error("no connection within {0:?}")]
    Timeout(Duration),
}

/// Represents the ability to check whether an endpoint accepts connections.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempts one connection to `endpoint`, releasing it immediately on
    /// success.
    async fn probe(&self, endpoint: &Endpoint) -> Result<(), ProbeFailure>;
}

/// Probes endpoints by opening (and immediately closing) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    /// Creates a prober that gives up on a connection attempt after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(crate::discovery::DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, endpoint: &Endpoint) -> Result<(), ProbeFailure> {
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(endpoint.as_str()))
            .await
            .map_err(|_| ProbeFailure::Timeout(self.timeout))??;
        drop(stream);
        Ok(())
    }
}

/// Probes `endpoints` in order, returning at most `max` reachable ones.
///
/// Up to `window` probes are in flight at once, but results are committed in
/// list order, so a later endpoint never displaces an earlier one that is
/// still pending. Probes still outstanding when the quota is met are dropped.
/// With `max == 0` no probe is attempted.
pub async fn probe_endpoints<P: Prober + ?Sized>(
    prober: &P,
    endpoints: &[Endpoint],
    max: usize,
    window: NonZeroUsize,
) -> Vec<Endpoint> {
    let mut reachable = Vec::with_capacity(max.min(endpoints.len()));
    if max == 0 {
        return reachable;
    }

    let mut probes = stream::iter(endpoints)
        .map(|endpoint| async move { (endpoint, prober.probe(endpoint).await) })
        .buffered(window.get());

    while let Some((endpoint, outcome)) = probes.next().await {
        match outcome {
            Ok(()) => {
                #[cfg(feature = "log")]
                tracing::debug!(%endpoint, "node reachable");
                reachable.push(endpoint.clone());
                if reachable.len() == max {
                    break;
                }
            }
            Err(err) => {
                #[cfg(feature = "log")]
                tracing::info!(%endpoint, error = %err, "could not connect to node");
            }
        }
    }

    reachable
}
