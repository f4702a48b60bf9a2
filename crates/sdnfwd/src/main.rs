//! sdnfwdd entry point.
//!
//! Runs the forwarding controller against a static topology file, with
//! log-only rule installation and packet I/O.

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, warn};
use sdnfwd::config::{load_netcfg, ControllerConfig, ForwardingMode};
use sdnfwd::flood::FloodMode;
use sdnfwd::inventory::{InMemoryInventory, LoggingPacketIo, LoggingRuleInstaller};
use sdnfwd::stats::{spawn_reporter, FilePortStats};
use sdnfwd::{Collaborators, ControllerDaemon, ControllerDaemonConfig, EventSender, PacketEventController};
use sdnfwd_common::{ControllerEvent, InboundPacket};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// SDN forwarding controller
#[derive(Parser, Debug)]
#[command(name = "sdnfwdd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller settings (JSON)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Network configuration with per-application sections (JSON)
    #[arg(short = 'n', long)]
    netcfg: Option<PathBuf>,

    /// Static topology: devices, links and hosts (JSON)
    #[arg(short = 't', long)]
    topology: Option<PathBuf>,

    /// Forwarding mode, overrides the settings file
    #[arg(short = 'm', long, value_enum)]
    mode: Option<ForwardingMode>,

    /// Flood mode, overrides the settings file
    #[arg(long, value_enum)]
    flood_mode: Option<FloodMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Port statistics report interval in seconds (0 disables)
    #[arg(long)]
    stats_interval: Option<u64>,

    /// Port counter samples (JSON), re-read on every report
    #[arg(long)]
    port_stats: Option<PathBuf>,

    /// Install the ICMP baseline rules
    #[arg(long)]
    icmp_baseline: bool,

    /// Packet-ins to replay, one JSON object per line
    #[arg(short = 'p', long)]
    packets: Option<PathBuf>,

    /// Event channel capacity
    #[arg(long, default_value = "1024")]
    channel_capacity: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("sdnfwdd failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn controller_config(args: &Args) -> anyhow::Result<ControllerConfig> {
    let mut config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(flood_mode) = args.flood_mode {
        config.flood_mode = flood_mode;
    }
    if let Some(interval) = args.stats_interval {
        config.stats_interval_secs = interval;
    }
    if args.icmp_baseline {
        config.icmp_baseline_enabled = true;
    }
    config.validate()?;
    Ok(config)
}

async fn replay_packets(path: &Path, sender: &EventSender) -> anyhow::Result<usize> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let mut count = 0;
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let packet: InboundPacket = serde_json::from_str(line)
            .with_context(|| format!("{}:{}", path.display(), index + 1))?;
        sender.send(ControllerEvent::PacketIn(packet)).await?;
        count += 1;
    }
    Ok(count)
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!("Starting sdnfwdd {}", env!("CARGO_PKG_VERSION"));

    let config = controller_config(&args)?;
    info!("Forwarding mode: {}", config.mode);
    info!("Flood mode: {}", config.flood_mode);

    let inventory = match &args.topology {
        Some(path) => InMemoryInventory::load(path)
            .with_context(|| format!("loading topology from {}", path.display()))?,
        None => {
            warn!("No topology file given, starting with an empty inventory");
            InMemoryInventory::new()
        }
    };
    let inventory = Arc::new(inventory);
    let installer = Arc::new(LoggingRuleInstaller::new());
    let packet_io = Arc::new(LoggingPacketIo::new());

    let controller = Arc::new(PacketEventController::new(
        config.clone(),
        Collaborators {
            topology: inventory.clone(),
            hosts: inventory.clone(),
            installer: installer.clone(),
            packet_io: packet_io.clone(),
        },
    ));
    let mut daemon = ControllerDaemon::new(
        ControllerDaemonConfig {
            channel_capacity: args.channel_capacity,
        },
        Arc::clone(&controller),
    );
    let sender = daemon.event_sender();

    controller.start();

    if let Some(path) = &args.netcfg {
        let apps = load_netcfg(path)
            .with_context(|| format!("loading network configuration from {}", path.display()))?;
        info!("Applying {} application config(s) from {}", apps.len(), path.display());
        for decision in controller.apply_configs(apps) {
            debug!("Startup config -> {:?}", decision);
        }
    }

    let replay = args.packets.clone().map(|path| {
        let sender = sender.clone();
        tokio::spawn(async move {
            match replay_packets(&path, &sender).await {
                Ok(count) => info!("Replayed {} packet-in(s) from {}", count, path.display()),
                Err(e) => error!("Packet replay failed: {:#}", e),
            }
        })
    });

    let reporter = match (&args.port_stats, config.stats_interval_secs) {
        (_, 0) => None,
        (Some(path), secs) => {
            info!("Reporting port statistics from {} every {}s", path.display(), secs);
            Some(spawn_reporter(
                inventory.clone(),
                Arc::new(FilePortStats::new(path)),
                Duration::from_secs(secs),
            ))
        }
        (None, _) => {
            warn!("No port statistics feed given, report disabled");
            None
        }
    };

    let stop = daemon.stop_handle();
    let shutdown_handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received SIGINT, shutting down gracefully...");
                stop.stop();
            }
            Err(err) => {
                error!("Failed to listen for ctrl-c: {}", err);
            }
        }
    });

    daemon.run().await;

    shutdown_handle.abort();
    if let Some(replay) = replay {
        replay.abort();
    }
    if let Some(reporter) = reporter {
        reporter.abort();
    }

    for line in daemon.dump() {
        info!("{}", line);
    }
    info!(
        "Rules installed: {}, packet-outs: {}, blocked: {}",
        installer.total_installed(),
        packet_io.packet_outs(),
        packet_io.blocked()
    );
    controller.shutdown();
    info!("sdnfwdd shutdown complete");
    Ok(())
}
