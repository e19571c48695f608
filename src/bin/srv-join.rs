//! Generates a node runner script, optionally joining peers found via SRV records.

use anyhow::Context;
use clap::Parser;
use srv_join::{launch::LaunchConfig, Discovery, DiscoveryConfig};
use std::{num::NonZeroUsize, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "srv-join", version)]
#[command(about = "Generate a node runner script with a join list discovered from SRV records")]
struct Args {
    /// Path to the launch config file
    #[arg(long)]
    config: PathBuf,

    /// Path of the runner script to generate
    #[arg(long, default_value = "/tmp/crdb-start.sh")]
    output: PathBuf,

    /// Discover reachable nodes from the config's SRV records
    #[arg(long)]
    service_discovery: bool,

    /// Static locality, overriding the config's `locality` argument
    #[arg(long)]
    locality: Option<String>,

    /// Debug logging
    #[arg(long)]
    debug: bool,

    /// Seconds allowed for each connection attempt
    #[arg(long, default_value_t = 5)]
    probe_timeout: u64,

    /// Connection attempts allowed in flight at once
    #[arg(long, default_value_t = 1)]
    probe_window: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "srv-join starting");

    let mut config = LaunchConfig::read(&args.config)?;
    tracing::debug!(output = %args.output.display(), "output path");

    if let Some(locality) = &args.locality {
        config.set_locality(locality);
    }

    if args.service_discovery {
        let probe_window =
            NonZeroUsize::new(args.probe_window).context("--probe-window must be at least 1")?;
        let discovery_config = DiscoveryConfig::default()
            .probe_timeout(Duration::from_secs(args.probe_timeout))
            .probe_window(probe_window);

        let discovery = Discovery::from_system_conf(discovery_config)
            .context("loading system DNS configuration")?;
        let join = discovery
            .find_nodes(config.srv.as_slice(), config.join_max)
            .await
            .context("discovering nodes")?;

        if join.is_empty() {
            tracing::warn!(srv = ?config.srv, "no nodes discovered");
        } else {
            tracing::info!(%join, "discovered nodes");
            config.set_join(&join);
        }
    }

    tracing::debug!(script = %config.runner_script(), "generated runner");
    config.write_runner_script(&args.output)?;

    Ok(())
}
