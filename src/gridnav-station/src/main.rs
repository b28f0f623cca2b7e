// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod console;
mod error;
mod session;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use gridnav_app::init_logging;
use gridnav_core::{ChannelListener, DynResult};

use config::{LinkKind, StationConfig};
use session::{Station, StationOptions};

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - robot ground station");

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Link kind (serial or tcp)
    #[arg(long = "link", value_parser = parse_link_kind)]
    link: Option<LinkKind>,
    /// Device path or host:port of the robot
    #[arg(short = 't', long = "target")]
    target: Option<String>,
    /// Serial baud rate
    #[arg(long = "baud")]
    baud: Option<u32>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,
    /// Connect on startup
    #[arg(long = "connect")]
    connect: bool,
}

fn parse_link_kind(s: &str) -> Result<LinkKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "serial" => Ok(LinkKind::Serial),
        "tcp" => Ok(LinkKind::Tcp),
        other => Err(format!("unknown link kind: {other} (expected serial or tcp)")),
    }
}

#[tokio::main]
async fn main() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", StationConfig::example_toml());
        return Ok(());
    }

    let (mut cfg, config_path) = if let Some(ref path) = cli.config {
        let cfg = StationConfig::load_from_file(path)?;
        (cfg, Some(path.clone()))
    } else {
        StationConfig::load_from_default_paths()?
    };

    // CLI > config
    if let Some(kind) = cli.link {
        cfg.link.kind = kind;
    }
    if let Some(target) = cli.target {
        cfg.link.target = Some(target);
    }
    if let Some(baud) = cli.baud {
        cfg.link.baud = baud;
    }
    if let Some(level) = cli.log_level {
        cfg.general.log_level = Some(level);
    }
    if cli.connect {
        cfg.link.auto_connect = true;
    }
    cfg.validate()?;

    init_logging(cfg.general.log_level.as_deref());
    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let transport = transport::from_config(&cfg.link);
    info!(
        "Starting gridnav-station (link: {}, target: {})",
        transport.name(),
        cfg.link.target.as_deref().unwrap_or("<none>")
    );

    let station = Arc::new(Station::new(
        transport,
        StationOptions {
            policy: cfg.session.policy(),
            write_timeout: Duration::from_millis(cfg.link.write_timeout_ms),
        },
    ));

    let (listener, events_rx) = ChannelListener::channel();
    station.register_listener(Arc::new(listener));
    tokio::spawn(console::render_events(events_rx));

    if cfg.link.auto_connect {
        if let Some(target) = cfg.link.target.as_deref() {
            if let Err(e) = station.connect(target).await {
                warn!("Initial connect to {} failed: {}", target, e);
            }
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let console = tokio::spawn(console::run_console(
        station.clone(),
        cfg.link.target.clone(),
        shutdown_rx,
    ));

    tokio::select! {
        res = signal::ctrl_c() => {
            res?;
            info!("Ctrl+C received, shutting down");
            let _ = shutdown_tx.send(true);
        }
        _ = console => {
            info!("Console closed, shutting down");
        }
    }

    station.disconnect().await?;
    Ok(())
}
