//! Data-plane tunnel serving.
//!
//! The projector parks a tunnel connection at the relay under its own
//! id and waits. The first packet through it means a client attached;
//! from then on the session loop publishes rotation ticks and
//! debounced resolution updates while consuming the frame stream.
//! When the session ends — peer close, transport error, or a reset
//! poke from the control plane — the projector clears its display and
//! parks again for the next client.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use holocast_core::protocol::control::{TunnelOpen, TunnelRole};
use holocast_core::protocol::stream::{FrameRendered, ResolutionChanged, VectorChanged};
use holocast_core::{EndpointId, HolocastCodec, HolocastError, MessageKind, Packet};

use crate::display::Display;
use crate::motion::{self, MotionSource};
use crate::resize;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Serves one client session at a time over the relay.
pub struct TunnelServer {
    id: EndpointId,
    tunnel_addr: String,
    motion: MotionSource,
    display: Display,
    resize_rx: mpsc::UnboundedReceiver<(u16, u16)>,
    reset_rx: mpsc::UnboundedReceiver<()>,
}

impl TunnelServer {
    pub fn new(
        id: EndpointId,
        tunnel_addr: String,
        resize_rx: mpsc::UnboundedReceiver<(u16, u16)>,
        reset_rx: mpsc::UnboundedReceiver<()>,
    ) -> Self {
        Self {
            id,
            tunnel_addr,
            motion: MotionSource::new(),
            display: Display::new(),
            resize_rx,
            reset_rx,
        }
    }

    /// Park, serve, repeat — forever.
    pub async fn run(mut self) {
        loop {
            match self.serve_once().await {
                Ok(()) => {}
                Err(e) => {
                    debug!("tunnel session failed: {e}");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    async fn serve_once(&mut self) -> Result<(), HolocastError> {
        let stream = TcpStream::connect(&self.tunnel_addr).await?;
        let mut framed = Framed::new(stream, HolocastCodec);
        framed
            .send(
                TunnelOpen {
                    key: self.id.clone(),
                    role: TunnelRole::Projector,
                }
                .into_packet()?,
            )
            .await?;
        debug!("parked on relay; waiting for a client");

        // Notifications left over from the previous session are
        // meaningless now.
        while self.reset_rx.try_recv().is_ok() {}
        while self.resize_rx.try_recv().is_ok() {}

        // Nothing flows until a client attaches; its first packet
        // opens the session.
        let first = match framed.next().await {
            Some(Ok(packet)) => packet,
            Some(Err(e)) => return Err(e),
            None => return Ok(()), // relay dropped or replaced us
        };
        info!("client attached; session live");
        self.display.clear();
        handle_stream_packet(&mut self.display, first);

        let (mut tx, mut rx) = framed.split();

        // Binding the resize handling announces the current size
        // right away; the client needs a surface to render for.
        let (width, height) = resize::surface_size();
        tx.send(
            ResolutionChanged {
                width: width as u32,
                height: height as u32,
            }
            .into_packet()?,
        )
        .await?;

        let mut motion_timer = tokio::time::interval(motion::TICK);
        motion_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        // Single pending debounce timer, restarted on every resize.
        let debounce = tokio::time::sleep(resize::DEBOUNCE);
        tokio::pin!(debounce);
        let mut pending_resize: Option<(u16, u16)> = None;

        let display = &mut self.display;
        let motion_src = &mut self.motion;
        let resize_rx = &mut self.resize_rx;
        let reset_rx = &mut self.reset_rx;

        // Disable a notification arm once its channel closes, so a
        // dead watcher cannot spin the loop.
        let mut resize_open = true;
        let mut reset_open = true;

        loop {
            tokio::select! {
                maybe = rx.next() => match maybe {
                    Some(Ok(packet)) => handle_stream_packet(display, packet),
                    Some(Err(e)) => {
                        debug!("tunnel read failed: {e}");
                        break;
                    }
                    None => {
                        debug!("tunnel closed by peer");
                        break;
                    }
                },
                _ = motion_timer.tick() => {
                    let update = VectorChanged::from_vector(motion_src.tick());
                    if tx.send(update.into_packet()?).await.is_err() {
                        break;
                    }
                }
                maybe = resize_rx.recv(), if resize_open => match maybe {
                    Some(size) => {
                        pending_resize = Some(size);
                        debounce
                            .as_mut()
                            .reset(tokio::time::Instant::now() + resize::DEBOUNCE);
                    }
                    None => resize_open = false,
                },
                _ = debounce.as_mut(), if pending_resize.is_some() => {
                    if let Some((w, h)) = pending_resize.take() {
                        let update = ResolutionChanged {
                            width: w as u32,
                            height: h as u32,
                        };
                        if tx.send(update.into_packet()?).await.is_err() {
                            break;
                        }
                    }
                }
                maybe = reset_rx.recv(), if reset_open => match maybe {
                    Some(()) => {
                        info!("resetting after client loss");
                        break;
                    }
                    None => reset_open = false,
                },
            }
        }

        self.display.clear();
        Ok(())
    }
}

/// Dispatch one packet from the client. Anything unexpected is logged
/// and dropped; the session stays up.
fn handle_stream_packet(display: &mut Display, packet: Packet) {
    match packet.kind() {
        Ok(MessageKind::FrameRendered) => match FrameRendered::from_bytes(packet.payload()) {
            Ok(msg) => {
                if let Err(e) = display.ingest(&msg.frame) {
                    warn!("undecodable frame dropped: {e}");
                }
            }
            Err(e) => warn!("malformed frame message dropped: {e}"),
        },
        Ok(other) => warn!(%other, "unexpected message from client"),
        Err(_) => warn!(kind = packet.raw_kind(), "unknown message from client dropped"),
    }
}
