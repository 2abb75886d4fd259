//! holocast projector — entry point.
//!
//! ```text
//! holocast-projector                         Connect to a local hub
//! holocast-projector --hub <addr>            Control-plane address
//! holocast-projector --tunnel <addr>         Data-plane relay address
//! ```

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use holocast_core::EndpointId;
use holocast_projector::tunnel::TunnelServer;
use holocast_projector::{control, resize};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "holocast-projector", about = "holocast projector endpoint")]
struct Cli {
    /// Hub control-plane address.
    #[arg(long, default_value = "127.0.0.1:7400")]
    hub: String,

    /// Hub data-plane relay address.
    #[arg(long, default_value = "127.0.0.1:7401")]
    tunnel: String,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let id = EndpointId::generate();
    info!("holocast-projector v{}", env!("CARGO_PKG_VERSION"));
    info!(projector = %id, hub = %cli.hub, "starting");

    // Resize notifications feed the tunnel layer; resets come from the
    // control plane when the broker reports the client gone.
    let resize_rx = resize::spawn_watcher();
    let (reset_tx, reset_rx) = mpsc::unbounded_channel();

    let server = TunnelServer::new(id.clone(), cli.tunnel.clone(), resize_rx, reset_rx);
    tokio::spawn(server.run());

    tokio::select! {
        _ = control::run_control(id, cli.hub, reset_tx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }
    Ok(())
}
