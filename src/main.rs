//! front-door binary.
//!
//! Loads configuration (compiled-in defaults or `--config <file>`), applies
//! `PORT`, and serves until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use front_door::config::{apply_env, load_config, FrontDoorConfig};
use front_door::lifecycle::{signals, Shutdown};
use front_door::observability::{init_logging, metrics};
use front_door::HttpServer;

#[derive(Parser)]
#[command(name = "front-door")]
#[command(about = "Routes requests to local handlers or a single upstream", long_about = None)]
struct Cli {
    /// TOML configuration file; compiled-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FrontDoorConfig::default(),
    };
    let config = apply_env(config);

    init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.address,
        config_file = ?cli.config,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config)?;

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        "Application is running on: {}",
        config.local_api.entry_url(local_addr.port())
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
