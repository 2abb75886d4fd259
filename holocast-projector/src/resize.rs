//! Terminal resize watcher.
//!
//! Crossterm's event API is synchronous, so a blocking thread polls it
//! and forwards resize notifications over a channel. The tunnel layer
//! debounces them before telling the client.

use std::time::Duration;

use crossterm::event::{self, Event};
use tokio::sync::mpsc;

/// Quiet period a resize burst must settle for before it is announced.
pub const DEBOUNCE: Duration = Duration::from_millis(250);

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Current surface dimensions, with a sane fallback when no terminal
/// is attached.
pub fn surface_size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or((80, 24))
}

/// Spawn the watcher thread; the receiver yields raw `(width, height)`
/// notifications as they happen.
pub fn spawn_watcher() -> mpsc::UnboundedReceiver<(u16, u16)> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        loop {
            if tx.is_closed() {
                break;
            }
            if event::poll(POLL_INTERVAL).unwrap_or(false) {
                if let Ok(Event::Resize(width, height)) = event::read() {
                    if tx.send((width, height)).is_err() {
                        break;
                    }
                }
                // Keys and mouse events are not ours to handle.
            }
        }
    });
    rx
}
