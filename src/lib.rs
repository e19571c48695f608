#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Resolve a bounded, reachable join list for a clustered service from DNS SRV
records.

# Introduction

SRV Records, as defined in [RFC 2782](https://tools.ietf.org/html/rfc2782),
are DNS records of the form

`_Service._Proto.Name TTL Class SRV Priority Weight Port Target`

For instance, the headless Service of a database cluster might answer
`_grpc._tcp.cockroachdb.default.svc.cluster.local` with:

```text
_grpc._tcp.cockroachdb.default.svc.cluster.local. 30 IN SRV 0 10 26257 node-0.cockroachdb.default.svc.cluster.local.
_grpc._tcp.cockroachdb.default.svc.cluster.local. 30 IN SRV 0 5  26257 node-1.cockroachdb.default.svc.cluster.local.
_grpc._tcp.cockroachdb.default.svc.cluster.local. 30 IN SRV 1 0  26257 node-2.cockroachdb.default.svc.cluster.local.
```

A node about to start needs a handful of peers that are actually up. Both
priority 0 targets are preferred over `node-2`, and `node-0` should come
first about twice as often as `node-1` because of its weight.

[`Discovery::find_nodes`] looks up every configured SRV name, merges the
answers, orders them per RFC 2782 (see [`order`]) and connects to the
candidates in that order until it has found the requested number of
reachable nodes. The resulting [`JoinList`] displays as the comma-separated
`host:port` list a node's `--join` flag expects.

A malformed SRV name or a failed lookup aborts the run. An unreachable
candidate does not; it is logged and skipped, and a run that finds nothing
succeeds with an empty list.

# Alternative Resolvers and Probers

Lookups and connection attempts go through the [`SrvResolver`] and
[`Prober`] traits, so either can be replaced, e.g. by in-memory fakes in
tests. The provided resolver backend is enabled by the following feature:

- `hickory` (via [`hickory_resolver::Resolver`])

[`SrvResolver`]: resolver::SrvResolver
[`Prober`]: probe::Prober
*/

mod discovery;
pub use discovery::{
    Discovery, DiscoveryConfig, Error, JoinList, DEFAULT_PROBE_TIMEOUT, DEFAULT_RESOLVE_TIMEOUT,
};

mod name;
pub use name::{InvalidRecordFormat, SrvName};

mod record;
pub use record::{Endpoint, SrvCandidate, SrvRecord};

pub mod order;

pub mod probe;

pub mod resolver;

#[cfg(feature = "cli")]
pub mod launch;
