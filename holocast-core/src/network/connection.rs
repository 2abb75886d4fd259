//! Managed TCP connection with background reader/writer tasks.
//!
//! Wraps a framed stream so callers deal in whole packets. The read
//! side folds transport errors and graceful closes into the same
//! signal — `recv` returns `None` either way, because the session
//! layers never distinguish them. Heartbeats are emitted on an
//! interval and consumed on arrival; they never reach the caller.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::codec::HolocastCodec;
use crate::error::HolocastError;
use crate::message::MessageKind;
use crate::packet::Packet;

/// Interval between keep-alive heartbeats.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Channel depth between the caller and the network tasks.
const CHANNEL_DEPTH: usize = 64;

/// Cloneable handle for sending packets on a [`Connection`].
pub type ConnectionSender = mpsc::Sender<Packet>;

/// A managed connection to a holocast peer.
#[derive(Debug)]
pub struct Connection {
    // Channel to the background writer task.
    tx: mpsc::Sender<Packet>,
    // Channel from the background reader task.
    rx: mpsc::Receiver<Packet>,
}

impl Connection {
    /// Wrap an established stream, with heartbeats enabled.
    pub fn new(stream: TcpStream) -> Self {
        Self::with_heartbeat(stream, true)
    }

    /// Wrap an established stream. `heartbeat` controls whether this
    /// side emits periodic keep-alives.
    pub fn with_heartbeat(stream: TcpStream, heartbeat: bool) -> Self {
        let (mut net_writer, mut net_reader) = Framed::new(stream, HolocastCodec).split();

        // User -> Network
        let (user_tx, mut network_rx) = mpsc::channel::<Packet>(CHANNEL_DEPTH);
        // Network -> User
        let (network_tx, user_rx) = mpsc::channel::<Packet>(CHANNEL_DEPTH);

        // Writer task.
        tokio::spawn(async move {
            while let Some(packet) = network_rx.recv().await {
                if let Err(e) = net_writer.send(packet).await {
                    debug!("connection write side closed: {e}");
                    break;
                }
            }
        });

        // Reader task. Decode errors end the stream exactly like a
        // close would; heartbeats are swallowed here.
        tokio::spawn(async move {
            while let Some(result) = net_reader.next().await {
                match result {
                    Ok(packet) if packet.raw_kind() == MessageKind::Heartbeat as u32 => {}
                    Ok(packet) => {
                        if network_tx.send(packet).await.is_err() {
                            // Receiver dropped; stop reading.
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("connection read side closed: {e}");
                        break;
                    }
                }
            }
        });

        if heartbeat {
            let heartbeat_tx = user_tx.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
                loop {
                    interval.tick().await;
                    if heartbeat_tx.send(Packet::heartbeat()).await.is_err() {
                        break;
                    }
                }
            });
        }

        Self {
            tx: user_tx,
            rx: user_rx,
        }
    }

    /// Connect to `addr` (e.g. `"127.0.0.1:7400"`).
    pub async fn connect(addr: &str) -> Result<Self, HolocastError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Queue a packet for sending.
    pub async fn send(&self, packet: Packet) -> Result<(), HolocastError> {
        self.tx
            .send(packet)
            .await
            .map_err(|_| HolocastError::ChannelClosed)
    }

    /// Cloneable sender half.
    pub fn sender(&self) -> ConnectionSender {
        self.tx.clone()
    }

    /// Receive the next packet. `None` means the transport is gone —
    /// closed or errored, the caller treats both the same.
    pub async fn recv(&mut self) -> Option<Packet> {
        self.rx.recv().await
    }
}
