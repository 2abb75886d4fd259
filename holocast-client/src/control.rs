//! Control-plane session and streaming lifecycle.
//!
//! The client announces readiness, then waits for the broker to point
//! it at a projector. Each assignment opens a fresh tunnel and a fresh
//! paced streaming loop; `ProjectorGone`, a dead tunnel, or a lost hub
//! link tears the session down. Losing the hub is not fatal — the
//! outer loop reconnects and re-announces, landing this client back in
//! the queue.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use holocast_core::protocol::control::{ClientReady, ProjectorAssigned, TunnelOpen, TunnelRole};
use holocast_core::protocol::stream::{FrameRendered, ResolutionChanged, VectorChanged};
use holocast_core::{
    Connection, EndpointId, FrameSink, HolocastCodec, HolocastError, MessageKind, Packet,
    StreamService,
};

use crate::frame::PatternSource;
use crate::render::RenderState;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// How a streaming session ended.
enum SessionEnd {
    /// The broker said the projector is gone.
    ProjectorGone,
    /// The tunnel died underneath us.
    TunnelClosed,
    /// The hub link itself is gone.
    HubLost,
}

/// Run the client forever: announce, stream, recover.
pub async fn run_client(id: EndpointId, hub_addr: String, tunnel_addr: String) {
    loop {
        match session(&id, &hub_addr, &tunnel_addr).await {
            Ok(()) => warn!("hub link closed; reconnecting"),
            Err(e) => warn!("hub session failed: {e}; reconnecting"),
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// One hub connection's worth of lifetime: returns when the hub link
/// goes away.
async fn session(
    id: &EndpointId,
    hub_addr: &str,
    tunnel_addr: &str,
) -> Result<(), HolocastError> {
    let mut conn = Connection::connect(hub_addr).await?;
    conn.send(
        ClientReady {
            client_id: id.clone(),
        }
        .into_packet()?,
    )
    .await?;
    info!(client = %id, "waiting for a projector");

    let render = RenderState::new();

    while let Some(packet) = conn.recv().await {
        match packet.kind() {
            Ok(MessageKind::ProjectorAssigned) => {
                match ProjectorAssigned::from_bytes(packet.payload()) {
                    Ok(msg) => {
                        info!(projector = %msg.projector_id, "projector assigned");
                        match stream_session(&mut conn, tunnel_addr, &msg.projector_id, &render)
                            .await
                        {
                            Ok(SessionEnd::HubLost) => return Ok(()),
                            Ok(SessionEnd::ProjectorGone) => info!("awaiting re-pairing"),
                            Ok(SessionEnd::TunnelClosed) => info!("awaiting re-pairing"),
                            Err(e) => {
                                debug!("stream session failed: {e}");
                                info!("awaiting re-pairing");
                            }
                        }
                    }
                    Err(e) => warn!("malformed pairing directive dropped: {e}"),
                }
            }
            Ok(MessageKind::ProjectorGone) => debug!("projector gone; no active session"),
            Ok(other) => debug!(%other, "unexpected control message ignored"),
            Err(_) => warn!(kind = packet.raw_kind(), "unknown control message dropped"),
        }
    }
    Ok(())
}

/// Stream frames to the assigned projector until something ends the
/// session. The paced loop is always cancelled on the way out — a
/// leaked loop would keep sending into a dead tunnel.
async fn stream_session(
    conn: &mut Connection,
    tunnel_addr: &str,
    projector_id: &EndpointId,
    render: &RenderState,
) -> Result<SessionEnd, HolocastError> {
    let stream = TcpStream::connect(tunnel_addr).await?;
    let mut framed = Framed::new(stream, HolocastCodec);
    framed
        .send(
            TunnelOpen {
                key: projector_id.clone(),
                role: TunnelRole::Client,
            }
            .into_packet()?,
        )
        .await?;
    let (tunnel_tx, mut tunnel_rx) = framed.split();

    // Fresh pacing state per session.
    let mut service = StreamService::new(PatternSource::new(render), TunnelSink { tx: tunnel_tx });
    let cancel = service.cancel_handle();
    let mut streamer = tokio::spawn(async move { service.run().await });
    let mut streamer_done = false;
    info!("tunnel open; streaming frames");

    let end = loop {
        tokio::select! {
            maybe = conn.recv() => match maybe {
                None => break SessionEnd::HubLost,
                Some(packet) => match packet.kind() {
                    Ok(MessageKind::ProjectorGone) => {
                        info!("projector disconnected; tearing down");
                        break SessionEnd::ProjectorGone;
                    }
                    Ok(other) => debug!(%other, "control message during session ignored"),
                    Err(_) => {
                        warn!(kind = packet.raw_kind(), "unknown control message dropped");
                    }
                },
            },
            maybe = tunnel_rx.next() => match maybe {
                Some(Ok(packet)) => apply_stream_packet(render, packet),
                Some(Err(e)) => {
                    debug!("tunnel read failed: {e}");
                    break SessionEnd::TunnelClosed;
                }
                None => {
                    debug!("tunnel closed");
                    break SessionEnd::TunnelClosed;
                }
            },
            result = &mut streamer, if !streamer_done => {
                streamer_done = true;
                match result {
                    Ok(Ok(())) => debug!("stream loop finished"),
                    Ok(Err(e)) => debug!("stream loop ended: {e}"),
                    Err(e) => warn!("stream task failed: {e}"),
                }
                break SessionEnd::TunnelClosed;
            }
        }
    };

    cancel.cancel();
    if !streamer_done {
        let _ = streamer.await;
    }
    Ok(end)
}

/// Apply one data-plane update to the render state. Unknown messages
/// are logged and dropped; the session stays up.
fn apply_stream_packet(render: &RenderState, packet: Packet) {
    match packet.kind() {
        Ok(MessageKind::VectorChanged) => match VectorChanged::from_bytes(packet.payload()) {
            Ok(msg) => render.set_rotation(msg.vector()),
            Err(e) => warn!("malformed rotation update dropped: {e}"),
        },
        Ok(MessageKind::ResolutionChanged) => {
            match ResolutionChanged::from_bytes(packet.payload()) {
                Ok(msg) => {
                    info!(width = msg.width, height = msg.height, "target resolution changed");
                    render.set_resolution(msg.resolution());
                }
                Err(e) => warn!("malformed resolution update dropped: {e}"),
            }
        }
        Ok(other) => warn!(%other, "unexpected message from projector"),
        Err(_) => warn!(kind = packet.raw_kind(), "unknown message from projector dropped"),
    }
}

/// Delivers encoded frames into the tunnel's write half.
struct TunnelSink {
    tx: SplitSink<Framed<TcpStream, HolocastCodec>, Packet>,
}

#[async_trait]
impl FrameSink for TunnelSink {
    async fn deliver(&mut self, frame: Vec<u8>) -> Result<(), HolocastError> {
        self.tx.send(FrameRendered { frame }.into_packet()?).await
    }
}
