//! holocast client — entry point.
//!
//! ```text
//! holocast-client                        Connect to a local hub
//! holocast-client --hub <addr>           Control-plane address
//! holocast-client --tunnel <addr>        Data-plane relay address
//! ```

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use holocast_client::control;
use holocast_core::EndpointId;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "holocast-client", about = "holocast client endpoint")]
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
    info!("holocast-client v{}", env!("CARGO_PKG_VERSION"));
    info!(client = %id, hub = %cli.hub, "starting");

    tokio::select! {
        _ = control::run_client(id, cli.hub, cli.tunnel) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }
    Ok(())
}
