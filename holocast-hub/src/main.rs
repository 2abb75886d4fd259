//! holocast hub — entry point.
//!
//! ```text
//! holocast-hub                     Run with defaults (control 7400, tunnel 7401)
//! holocast-hub --config <path>     Load a custom config TOML
//! holocast-hub --gen-config        Write default config to stdout
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use holocast_core::Broker;
use holocast_hub::config::HubConfig;
use holocast_hub::relay::{Relay, run_relay};
use holocast_hub::{run_broker, run_control_plane};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "holocast-hub", about = "holocast session broker and relay")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "holocast-hub.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&HubConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = HubConfig::load(&cli.config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("holocast-hub v{}", env!("CARGO_PKG_VERSION"));
    info!("control port: {}", config.network.control_port);
    info!("tunnel port: {}", config.network.tunnel_port);

    let control_listener = TcpListener::bind(config.control_addr()).await?;
    let tunnel_listener = TcpListener::bind(config.tunnel_addr()).await?;

    // One broker task serializes every control-plane event.
    let (event_tx, event_rx) = mpsc::channel(256);
    tokio::spawn(run_broker(Broker::new(), event_rx));

    // The relay runs independently of the broker.
    tokio::spawn(run_relay(tunnel_listener, Arc::new(Relay::new())));

    tokio::select! {
        result = run_control_plane(control_listener, event_tx) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }
    Ok(())
}
