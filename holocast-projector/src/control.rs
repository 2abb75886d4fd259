//! Control-plane session with the hub.
//!
//! Announces this projector, then listens for broker status messages.
//! Losing the hub is not fatal: the loop reconnects and re-announces,
//! which the broker treats like any other readiness event.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use holocast_core::protocol::control::ProjectorReady;
use holocast_core::{Connection, EndpointId, HolocastError, MessageKind};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Run the control session forever. `reset_tx` pokes the tunnel layer
/// whenever the broker says the paired client is gone.
pub async fn run_control(id: EndpointId, hub_addr: String, reset_tx: mpsc::UnboundedSender<()>) {
    loop {
        match announce_and_listen(&id, &hub_addr, &reset_tx).await {
            Ok(()) => warn!("hub link closed; reconnecting"),
            Err(e) => warn!("hub session failed: {e}; reconnecting"),
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn announce_and_listen(
    id: &EndpointId,
    hub_addr: &str,
    reset_tx: &mpsc::UnboundedSender<()>,
) -> Result<(), HolocastError> {
    let mut conn = Connection::connect(hub_addr).await?;
    conn.send(
        ProjectorReady {
            projector_id: id.clone(),
        }
        .into_packet()?,
    )
    .await?;
    info!(projector = %id, "announced ready to hub");

    while let Some(packet) = conn.recv().await {
        match packet.kind() {
            Ok(MessageKind::ClientGone) => {
                info!("client disconnected; resetting session");
                let _ = reset_tx.send(());
            }
            Ok(other) => debug!(%other, "unexpected control message ignored"),
            Err(_) => warn!(kind = packet.raw_kind(), "unknown control message dropped"),
        }
    }
    Ok(())
}
