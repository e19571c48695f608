use std::{num::NonZeroUsize, time::Duration};

/// Default time allowed for a single TCP connection attempt.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for a single SRV lookup.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for a [`Discovery`](super::Discovery) run.
///
/// The defaults reproduce strictly sequential discovery (one lookup and one
/// probe at a time) with explicit timeouts on both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    probe_timeout: Duration,
    resolve_timeout: Option<Duration>,
    probe_window: NonZeroUsize,
    parallel_resolution: bool,
    dedup_endpoints: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            resolve_timeout: Some(DEFAULT_RESOLVE_TIMEOUT),
            probe_window: NonZeroUsize::MIN,
            parallel_resolution: false,
            dedup_endpoints: false,
        }
    }
}

impl DiscoveryConfig {
    /// Time allowed for each TCP connection attempt.
    pub fn get_probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Time allowed for each SRV lookup, if bounded.
    pub fn get_resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout
    }

    /// Maximum number of probes in flight at once.
    pub fn get_probe_window(&self) -> NonZeroUsize {
        self.probe_window
    }

    /// Whether SRV names are looked up concurrently.
    pub fn get_parallel_resolution(&self) -> bool {
        self.parallel_resolution
    }

    /// Whether repeated endpoints are dropped before probing.
    pub fn get_dedup_endpoints(&self) -> bool {
        self.dedup_endpoints
    }

    /// Sets the time allowed for each TCP connection attempt.
    pub fn probe_timeout(self, probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            ..self
        }
    }

    /// Sets the time allowed for each SRV lookup; `None` leaves lookups
    /// bounded only by the resolver's own timeouts.
    pub fn resolve_timeout(self, resolve_timeout: Option<Duration>) -> Self {
        Self {
            resolve_timeout,
            ..self
        }
    }

    /// Sets how many probes may be in flight at once. Reachable endpoints are
    /// still reported in preference order.
    pub fn probe_window(self, probe_window: NonZeroUsize) -> Self {
        Self {
            probe_window,
            ..self
        }
    }

    /// Looks up all SRV names concurrently. The first failure to complete
    /// still aborts the run and cancels the remaining lookups.
    pub fn parallel_resolution(self, parallel_resolution: bool) -> Self {
        Self {
            parallel_resolution,
            ..self
        }
    }

    /// Drops endpoints already seen earlier in preference order, so
    /// overlapping SRV answers are probed once.
    pub fn dedup_endpoints(self, dedup_endpoints: bool) -> Self {
        Self {
            dedup_endpoints,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sequential() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.get_probe_window().get(), 1);
        assert!(!config.get_parallel_resolution());
        assert!(!config.get_dedup_endpoints());
        assert_eq!(config.get_probe_timeout(), DEFAULT_PROBE_TIMEOUT);
        assert_eq!(config.get_resolve_timeout(), Some(DEFAULT_RESOLVE_TIMEOUT));
    }

    #[test]
    fn setters_only_touch_their_field() {
        let config = DiscoveryConfig::default()
            .probe_timeout(Duration::from_millis(250))
            .dedup_endpoints(true);
        assert_eq!(config.get_probe_timeout(), Duration::from_millis(250));
        assert!(config.get_dedup_endpoints());
        assert_eq!(config.get_resolve_timeout(), Some(DEFAULT_RESOLVE_TIMEOUT));
    }
}
