//! Client-side streaming service.
//!
//! Drives the encode → send → pace cycle for one active session. The
//! frame producer and the delivery channel are trait seams so the loop
//! can be exercised without a real tunnel.
//!
//! # Lifetime
//!
//! Call [`run`](StreamService::run) to start the loop. It runs until
//! the [`CancellationToken`] from
//! [`cancel_handle`](StreamService::cancel_handle) fires — also
//! mid-sleep — or until the source or sink fails (a dead tunnel
//! surfaces as a sink error).

use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::HolocastError;
use crate::stream::pacer::FramePacer;

/// Produces one encoded frame per pacing cycle, at the source's fixed
/// quality setting.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Result<Vec<u8>, HolocastError>;
}

/// Delivers encoded frames to the paired projector.
#[async_trait]
pub trait FrameSink: Send {
    async fn deliver(&mut self, frame: Vec<u8>) -> Result<(), HolocastError>;
}

/// Paced send loop for one active session.
pub struct StreamService<S, K> {
    source: S,
    sink: K,
    pacer: FramePacer,
    cancel: CancellationToken,
    frames_sent: u64,
}

impl<S: FrameSource, K: FrameSink> StreamService<S, K> {
    /// Service with a fresh pacer at the default target rate. Pacing
    /// state must not survive across sessions — build a new service
    /// per pairing.
    pub fn new(source: S, sink: K) -> Self {
        Self::with_pacer(source, sink, FramePacer::new())
    }

    pub fn with_pacer(source: S, sink: K, pacer: FramePacer) -> Self {
        Self {
            source,
            sink,
            pacer,
            cancel: CancellationToken::new(),
            frames_sent: 0,
        }
    }

    /// Token that stops the loop, including mid-sleep. Clone it before
    /// moving the service into its task.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Frames delivered so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Run until cancelled or the transport dies.
    pub async fn run(&mut self) -> Result<(), HolocastError> {
        loop {
            if self.cancel.is_cancelled() {
                debug!(frames = self.frames_sent, "stream loop cancelled");
                return Ok(());
            }

            let cycle_start = Instant::now();
            let frame = self.source.next_frame().await?;
            self.sink.deliver(frame).await?;
            self.frames_sent += 1;

            let delay = self.pacer.complete_cycle(cycle_start.elapsed());
            if !delay.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        debug!(frames = self.frames_sent, "stream loop cancelled");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            } else {
                // Overrun: next cycle starts immediately, but the
                // executor still gets a turn.
                tokio::task::yield_now().await;
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingSource;

    #[async_trait]
    impl FrameSource for CountingSource {
        async fn next_frame(&mut self) -> Result<Vec<u8>, HolocastError> {
            // A small but non-zero encode cost keeps the pacer's
            // period bounded away from zero.
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            Ok(vec![0u8; 16])
        }
    }

    /// Sink that accepts `budget` frames, then reports a dead channel.
    struct LimitedSink {
        budget: u64,
        delivered: Arc<AtomicU64>,
    }

    #[async_trait]
    impl FrameSink for LimitedSink {
        async fn deliver(&mut self, _frame: Vec<u8>) -> Result<(), HolocastError> {
            if self.delivered.load(Ordering::SeqCst) >= self.budget {
                return Err(HolocastError::ChannelClosed);
            }
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn stops_when_sink_dies() {
        let delivered = Arc::new(AtomicU64::new(0));
        let sink = LimitedSink {
            budget: 3,
            delivered: Arc::clone(&delivered),
        };
        let mut service = StreamService::new(CountingSource, sink);

        let result = service.run().await;
        assert!(matches!(result, Err(HolocastError::ChannelClosed)));
        assert_eq!(service.frames_sent(), 3);
        assert_eq!(delivered.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let delivered = Arc::new(AtomicU64::new(0));
        let sink = LimitedSink {
            budget: u64::MAX,
            delivered: Arc::clone(&delivered),
        };
        let mut service = StreamService::new(CountingSource, sink);
        let cancel = service.cancel_handle();

        let task = tokio::spawn(async move { service.run().await });
        // Let a few cycles go through, then pull the plug.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        cancel.cancel();

        let result = task.await.unwrap();
        assert!(result.is_ok());
        assert!(delivered.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn cancelled_before_start_sends_nothing() {
        let delivered = Arc::new(AtomicU64::new(0));
        let sink = LimitedSink {
            budget: u64::MAX,
            delivered: Arc::clone(&delivered),
        };
        let mut service = StreamService::new(CountingSource, sink);
        service.cancel_handle().cancel();

        assert!(service.run().await.is_ok());
        assert_eq!(service.frames_sent(), 0);
    }
}
