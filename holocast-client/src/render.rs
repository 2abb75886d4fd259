//! Client-side render state.
//!
//! Last-write-wins storage for what the projector asked of us: the
//! rotation to draw the scene at and the output surface to target.
//! Readers observe the latest values through watch channels, so the
//! streaming loop never waits on state updates.

use tokio::sync::watch;

use holocast_core::protocol::stream::{RotationVector, TargetResolution};

pub struct RenderState {
    rotation_tx: watch::Sender<RotationVector>,
    resolution_tx: watch::Sender<TargetResolution>,
}

impl RenderState {
    pub fn new() -> Self {
        let (rotation_tx, _) = watch::channel(RotationVector::default());
        let (resolution_tx, _) = watch::channel(TargetResolution::default());
        Self {
            rotation_tx,
            resolution_tx,
        }
    }

    pub fn set_rotation(&self, vector: RotationVector) {
        self.rotation_tx.send_replace(vector);
    }

    pub fn rotation(&self) -> RotationVector {
        *self.rotation_tx.borrow()
    }

    pub fn watch_rotation(&self) -> watch::Receiver<RotationVector> {
        self.rotation_tx.subscribe()
    }

    pub fn set_resolution(&self, resolution: TargetResolution) {
        self.resolution_tx.send_replace(resolution);
    }

    pub fn resolution(&self) -> TargetResolution {
        *self.resolution_tx.borrow()
    }

    pub fn watch_resolution(&self) -> watch::Receiver<TargetResolution> {
        self.resolution_tx.subscribe()
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let state = RenderState::new();
        state.set_rotation(RotationVector {
            x: 1.0,
            y: 0.0,
            z: 0.0,
        });
        state.set_rotation(RotationVector {
            x: 0.0,
            y: 2.0,
            z: 0.0,
        });
        assert_eq!(state.rotation().y, 2.0);
        assert_eq!(state.rotation().x, 0.0);
    }

    #[test]
    fn watchers_observe_latest_value() {
        let state = RenderState::new();
        let rx = state.watch_resolution();
        state.set_resolution(TargetResolution {
            width: 800,
            height: 600,
        });
        assert_eq!(rx.borrow().width, 800);
    }
}
