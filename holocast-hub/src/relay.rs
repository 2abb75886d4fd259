//! Data-plane rendezvous relay.
//!
//! Pairs tunnel connections by key — the projector id named in the
//! pairing directive — and forwards packets verbatim in both
//! directions. The broker plays no part here: once both sides of a
//! pairing have opened their tunnels, all rotation/resolution/frame
//! traffic flows through the splice until either side closes, which
//! closes both. Each pairing gets its own splice; nothing in the relay
//! assumes there is only one.

use std::collections::HashMap;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use holocast_core::protocol::control::{TunnelOpen, TunnelRole};
use holocast_core::{HolocastCodec, MessageKind};

type TunnelStream = Framed<TcpStream, HolocastCodec>;

struct Parked {
    role: TunnelRole,
    stream: TunnelStream,
}

enum Rendezvous {
    /// Both sides present: splice them.
    Paired { mine: TunnelStream, peer: TunnelStream },
    /// First to arrive (or a re-registration): wait for the other side.
    Waiting,
}

/// Rendezvous state: at most one parked side per key.
#[derive(Default)]
pub struct Relay {
    parked: Mutex<HashMap<String, Parked>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Accept tunnel connections forever.
pub async fn run_relay(listener: TcpListener, relay: Arc<Relay>) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "tunnel connection accepted");
        tokio::spawn(handle_tunnel(Arc::clone(&relay), stream));
    }
}

async fn handle_tunnel(relay: Arc<Relay>, stream: TcpStream) {
    let mut framed = Framed::new(stream, HolocastCodec);

    // The first packet must introduce the connection.
    let hello = match framed.next().await {
        Some(Ok(packet)) => packet,
        Some(Err(e)) => {
            warn!("tunnel handshake failed: {e}");
            return;
        }
        None => return,
    };
    if hello.kind().ok() != Some(MessageKind::TunnelOpen) {
        warn!("tunnel connection did not introduce itself; dropping");
        return;
    }
    let open = match TunnelOpen::from_bytes(hello.payload()) {
        Ok(open) => open,
        Err(e) => {
            warn!("malformed tunnel introduction dropped: {e}");
            return;
        }
    };
    let key = open.key.as_str().to_string();

    let outcome = {
        let mut parked = relay.parked.lock().await;
        match parked.remove(&key) {
            Some(other) if other.role == open.role.counterpart() => Rendezvous::Paired {
                mine: framed,
                peer: other.stream,
            },
            replaced => {
                if replaced.is_some() {
                    // Same side re-registered; newest wins, the stale
                    // connection just got dropped.
                    debug!(key = %key, "replacing parked tunnel side");
                }
                parked.insert(
                    key.clone(),
                    Parked {
                        role: open.role,
                        stream: framed,
                    },
                );
                Rendezvous::Waiting
            }
        }
    };

    match outcome {
        Rendezvous::Waiting => {
            debug!(key = %key, role = ?open.role, "tunnel side parked");
        }
        Rendezvous::Paired { mine, peer } => {
            debug!(key = %key, "tunnel sides paired; splicing");
            splice(mine, peer, &key).await;
        }
    }
}

/// Forward packets both ways until either side goes away, then drop
/// both. Payloads are never inspected.
async fn splice(a: TunnelStream, b: TunnelStream, key: &str) {
    let (mut a_tx, mut a_rx) = a.split();
    let (mut b_tx, mut b_rx) = b.split();

    let a_to_b = async {
        while let Some(Ok(packet)) = a_rx.next().await {
            if b_tx.send(packet).await.is_err() {
                break;
            }
        }
    };
    let b_to_a = async {
        while let Some(Ok(packet)) = b_rx.next().await {
            if a_tx.send(packet).await.is_err() {
                break;
            }
        }
    };

    // Either direction ending tears down the whole splice; dropping
    // the halves closes both transports.
    tokio::select! {
        _ = a_to_b => {}
        _ = b_to_a => {}
    }
    debug!(key, "tunnel closed");
}

// ── Tests ────────────────────────────────────────────────────────
