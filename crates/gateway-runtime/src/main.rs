//! # Chaincode Gateway Runtime
//!
//! Connects to the configured nodes, discovers the channel topology, prints
//! it and disconnects.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `CG_*` environment, then flags)
//! 2. Initialize logging and metrics
//! 3. Load node descriptors
//! 4. Build the gateway container and connect
//! 5. Report the topology
//! 6. Disconnect

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use cg_03_channel_topology::TopologySnapshot;
use cg_06_query_facade::QueryApi;
use gateway_runtime::{
    load_descriptor_dir, spawn_metrics_recorder, Devnet, GatewayConfig, GatewayContainer,
};
use gateway_telemetry::init_telemetry;

#[derive(Parser, Debug)]
#[command(name = "gateway-runtime")]
#[command(about = "Connect to a permissioned ledger network and report its channel topology")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of JSON node descriptors
    #[arg(short, long)]
    nodes: Option<PathBuf>,

    /// Channel the devnet peers join (repeatable)
    #[arg(long = "channel")]
    channels: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = GatewayConfig::load(args.config.as_deref())
        .context("Failed to load gateway configuration")?;
    if let Some(dir) = args.nodes {
        config.nodes.descriptor_dir = Some(dir);
    }
    if !args.channels.is_empty() {
        config.devnet.channels = args.channels;
    }

    let telemetry = init_telemetry(config.telemetry.clone())?;
    info!(service = %config.telemetry.service_name, "Starting chaincode gateway");

    if !config.devnet.enabled {
        bail!("no ledger transport is available outside devnet mode; set CG_DEVNET=true");
    }

    let devnet = match &config.nodes.descriptor_dir {
        Some(dir) => {
            let nodes = load_descriptor_dir(dir)
                .with_context(|| format!("Failed to load node descriptors from {}", dir.display()))?;
            Devnet::with_nodes(&config.devnet, nodes)
        }
        None => Devnet::new(&config.devnet),
    };

    let gateway = GatewayContainer::new(
        config,
        Arc::new(devnet.network.clone()),
        Arc::new(devnet.wallets),
    );
    let recorder = telemetry
        .metrics()
        .map(|_| spawn_metrics_recorder(&gateway.event_bus));

    let snapshot = gateway
        .connect(devnet.nodes)
        .await
        .context("Failed to connect the gateway")?;
    print!("{}", render_topology(&gateway, &snapshot).await?);

    gateway.disconnect().await;

    if let Some(recorder) = recorder {
        tokio::task::yield_now().await;
        recorder.abort();
    }
    if let Some(metrics) = telemetry.metrics() {
        debug!(metrics = %metrics.encode()?, "Final metrics");
    }

    Ok(())
}

/// Human-readable topology report.
async fn render_topology(gateway: &GatewayContainer, snapshot: &TopologySnapshot) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Topology version {}", snapshot.version())?;

    for channel in snapshot.channels() {
        writeln!(out, "channel {}", channel.name())?;
        writeln!(out, "  orderer: {}", channel.orderer().name)?;
        for info in gateway.queries.list_channel_peers_info(channel.name()).await? {
            writeln!(out, "  peer: {} ({})", info.peer, info.msp_id)?;
        }
        let organizations = gateway.queries.list_organizations(channel.name()).await?;
        writeln!(out, "  organizations: {}", organizations.join(", "))?;
    }
    if !snapshot.peers_denied().is_empty() {
        writeln!(out, "peers without access: {}", snapshot.peers_denied().join(", "))?;
    }
    for peer in gateway.queries.list_peer_names() {
        let installed = gateway.queries.list_installed_chaincode(&peer).await?;
        writeln!(out, "peer {peer}: {} chaincode(s) installed", installed.len())?;
    }
    Ok(out)
}
