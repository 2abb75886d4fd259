//! Control-plane listener and broker actor.
//!
//! Every control connection gets its own task that decodes packets
//! into [`BrokerEvent`]s and forwards them over one shared channel —
//! the broker task consumes that channel alone, so all state updates
//! are serialized and handled to completion before the next event.
//! Directives flow back through each connection's unbounded writer.

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use holocast_core::protocol::control::{ClientReady, ProjectorReady};
use holocast_core::{
    Broker, DirectiveSender, EndpointId, HolocastCodec, MessageKind, Packet, PeerRole,
};

/// Events feeding the broker actor.
#[derive(Debug)]
pub enum BrokerEvent {
    ClientReady { id: EndpointId, tx: DirectiveSender },
    ProjectorReady { id: EndpointId, tx: DirectiveSender },
    PeerClosed { role: PeerRole },
}

/// Consume events until every sender is gone. This is the only task
/// that touches the broker's state.
pub async fn run_broker(mut broker: Broker, mut events: mpsc::Receiver<BrokerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            BrokerEvent::ClientReady { id, tx } => broker.client_ready(id, tx),
            BrokerEvent::ProjectorReady { id, tx } => broker.projector_ready(id, tx),
            BrokerEvent::PeerClosed { role } => broker.peer_closed(role),
        }
    }
}

/// Accept control connections forever.
pub async fn run_control_plane(
    listener: TcpListener,
    events: mpsc::Sender<BrokerEvent>,
) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "control connection accepted");
        tokio::spawn(handle_connection(stream, events.clone()));
    }
}

/// Drive one control connection until its transport goes away, then
/// resolve whatever role it held. Read errors and graceful closes end
/// up in the same place.
async fn handle_connection(stream: TcpStream, events: mpsc::Sender<BrokerEvent>) {
    let (mut writer, mut reader) = Framed::new(stream, HolocastCodec).split();
    let (directive_tx, mut directive_rx) = mpsc::unbounded_channel::<Packet>();

    // Writer task: broker directives go straight out.
    let write_task = tokio::spawn(async move {
        while let Some(packet) = directive_rx.recv().await {
            if writer.send(packet).await.is_err() {
                break;
            }
        }
    });

    let mut role = PeerRole::Unbound;
    while let Some(result) = reader.next().await {
        let packet = match result {
            Ok(packet) => packet,
            Err(e) => {
                debug!("control read ended: {e}");
                break;
            }
        };
        let kind = match packet.kind() {
            Ok(kind) => kind,
            Err(_) => {
                warn!(kind = packet.raw_kind(), "unknown control message dropped");
                continue;
            }
        };
        match kind {
            MessageKind::Heartbeat => {}
            MessageKind::ClientReady => match ClientReady::from_bytes(packet.payload()) {
                Ok(msg) => {
                    role = PeerRole::Client(msg.client_id.clone());
                    let event = BrokerEvent::ClientReady {
                        id: msg.client_id,
                        tx: directive_tx.clone(),
                    };
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("malformed client announcement dropped: {e}"),
            },
            MessageKind::ProjectorReady => match ProjectorReady::from_bytes(packet.payload()) {
                Ok(msg) => {
                    role = PeerRole::Projector(msg.projector_id.clone());
                    let event = BrokerEvent::ProjectorReady {
                        id: msg.projector_id,
                        tx: directive_tx.clone(),
                    };
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("malformed projector announcement dropped: {e}"),
            },
            other => warn!(%other, "unexpected message on the control plane"),
        }
    }

    let _ = events.send(BrokerEvent::PeerClosed { role }).await;
    write_task.abort();
}

// ── Tests ────────────────────────────────────────────────────────
