//! Session broker — pairs one projector with one client at a time.
//!
//! The broker owns all rendezvous state: the registered client map,
//! the wait queue, and the current pairing. It consumes control-plane
//! events and answers with directives pushed onto per-connection
//! unbounded channels, so no handler ever blocks or suspends. Run it
//! behind a single task (the hub drives it from one mpsc loop); the
//! state itself carries no locks.
//!
//! Pairing rules:
//! - at most one projector is active; a second announcement while one
//!   is live is ignored;
//! - a client is paired the moment both sides are free, otherwise it
//!   waits in FIFO order;
//! - a client displaced by projector loss goes to the *front* of the
//!   queue, so it is first in line when a projector returns.

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::identity::EndpointId;
use crate::packet::Packet;
use crate::protocol::control::{ClientGone, ProjectorAssigned, ProjectorGone};

/// Channel on which a control connection receives broker directives.
///
/// Unbounded on purpose: directive volume is tiny (a handful per
/// session) and the broker must never block inside a handler.
pub type DirectiveSender = mpsc::UnboundedSender<Packet>;

// ── PeerRole ─────────────────────────────────────────────────────

/// Role bound to a control connection at registration time.
///
/// The connection task stores this when it forwards a ready
/// announcement and resolves it explicitly when the transport closes —
/// a connection that never announced anything unwinds as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeerRole {
    /// No ready announcement seen on this connection yet.
    #[default]
    Unbound,
    Client(EndpointId),
    Projector(EndpointId),
}

// ── Broker ───────────────────────────────────────────────────────

struct ProjectorRecord {
    id: EndpointId,
    tx: DirectiveSender,
}

/// Process-wide rendezvous coordinator.
pub struct Broker {
    /// Every registered client, paired or waiting.
    clients: HashMap<EndpointId, DirectiveSender>,
    /// Clients waiting for the projector, front first.
    queue: VecDeque<EndpointId>,
    /// The active projector, if any.
    projector: Option<ProjectorRecord>,
    /// The client currently holding the projector. Set only while
    /// `projector` is set.
    active_client: Option<EndpointId>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            queue: VecDeque::new(),
            projector: None,
            active_client: None,
        }
    }

    // ── Event handlers ───────────────────────────────────────────

    /// A client announced readiness. Pairs it immediately when the
    /// projector is free, otherwise appends it to the wait queue.
    ///
    /// A repeat announcement for an id that is already active or
    /// queued only refreshes the stored connection handle — it never
    /// produces a duplicate queue entry.
    pub fn client_ready(&mut self, id: EndpointId, tx: DirectiveSender) {
        let known = self.clients.insert(id.clone(), tx).is_some();
        if known && (self.active_client.as_ref() == Some(&id) || self.queue.contains(&id)) {
            debug!(client = %id, "client re-registered; handle refreshed");
            return;
        }
        info!(client = %id, "client ready");
        if self.projector.is_some() && self.active_client.is_none() {
            self.assign(id);
        } else if self.projector.is_some() {
            info!(client = %id, "projector busy; client queued");
            self.queue.push_back(id);
        } else {
            info!(client = %id, "no projector yet; client queued");
            self.queue.push_back(id);
        }
    }

    /// A client's control connection went away.
    ///
    /// Unknown ids are a no-op. If the active client left, the
    /// projector is notified and the queue front (if any) is paired.
    pub fn client_disconnected(&mut self, id: &EndpointId) {
        if self.clients.remove(id).is_none() {
            return;
        }
        info!(client = %id, "client disconnected");
        if self.active_client.as_ref() == Some(id) {
            if let Some(p) = &self.projector {
                if let Ok(packet) = ClientGone.into_packet() {
                    let _ = p.tx.send(packet);
                }
            }
            self.active_client = None;
            if let Some(next) = self.queue.pop_front() {
                self.assign(next);
            }
        } else if let Some(pos) = self.queue.iter().position(|q| q == id) {
            // Splice; relative order of the rest is preserved.
            self.queue.remove(pos);
            debug!(client = %id, "client removed from queue");
        }
    }

    /// A projector announced readiness. Ignored while another
    /// projector is active (single-projector policy); otherwise the
    /// queue front, if any, is paired right away.
    pub fn projector_ready(&mut self, id: EndpointId, tx: DirectiveSender) {
        if let Some(p) = &self.projector {
            info!(projector = %id, current = %p.id, "projector already active; announcement ignored");
            return;
        }
        info!(projector = %id, "projector ready");
        self.projector = Some(ProjectorRecord { id, tx });
        if let Some(next) = self.queue.pop_front() {
            self.assign(next);
        }
    }

    /// The active projector's control connection went away. Any other
    /// projector id is a no-op. A paired client is notified and
    /// requeued at the *front*.
    pub fn projector_disconnected(&mut self, id: &EndpointId) {
        match &self.projector {
            Some(p) if &p.id == id => {}
            _ => return,
        }
        info!(projector = %id, "projector disconnected");
        self.projector = None;
        if let Some(client_id) = self.active_client.take() {
            if let Some(tx) = self.clients.get(&client_id) {
                if let Ok(packet) = ProjectorGone.into_packet() {
                    let _ = tx.send(packet);
                }
            }
            info!(client = %client_id, "displaced client requeued at the front");
            self.queue.push_front(client_id);
        }
    }

    /// Resolve a transport close against the role that connection
    /// held. `Unbound` connections unwind without side effects.
    pub fn peer_closed(&mut self, role: PeerRole) {
        match role {
            PeerRole::Unbound => {}
            PeerRole::Client(id) => self.client_disconnected(&id),
            PeerRole::Projector(id) => self.projector_disconnected(&id),
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Id of the active projector, if any.
    pub fn projector_id(&self) -> Option<&EndpointId> {
        self.projector.as_ref().map(|p| &p.id)
    }

    /// Id of the client currently holding the projector, if any.
    pub fn active_client(&self) -> Option<&EndpointId> {
        self.active_client.as_ref()
    }

    /// Waiting clients, front first.
    pub fn queued(&self) -> impl Iterator<Item = &EndpointId> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of registered clients (active, waiting, or idle).
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    // ── Internal ─────────────────────────────────────────────────

    /// Make `client_id` the active client and tell it which projector
    /// to open a tunnel to. Requires an active projector.
    fn assign(&mut self, client_id: EndpointId) {
        let Some(p) = &self.projector else {
            return;
        };
        let directive = ProjectorAssigned {
            projector_id: p.id.clone(),
        };
        match directive.into_packet() {
            Ok(packet) => {
                if let Some(tx) = self.clients.get(&client_id) {
                    let _ = tx.send(packet);
                }
            }
            Err(e) => debug!("failed to encode pairing directive: {e}"),
        }
        info!(client = %client_id, projector = %p.id, "client paired");
        self.active_client = Some(client_id);
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────
