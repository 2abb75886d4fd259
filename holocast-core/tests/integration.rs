//! Integration tests — broker pairing scenarios, pacing behavior, and
//! packet round-trips over a real TCP connection on localhost.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

use holocast_core::protocol::control::{ClientReady, ProjectorAssigned};
use holocast_core::protocol::stream::FrameRendered;
use holocast_core::{
    Broker, Connection, DirectiveSender, EndpointId, FramePacer, MessageKind, Packet, PeerRole,
};

// ── Helpers ──────────────────────────────────────────────────────

fn endpoint(name: &str) -> EndpointId {
    EndpointId::from(name)
}

fn directive_channel() -> (DirectiveSender, UnboundedReceiver<Packet>) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Pop the next directive, or `None` if the channel is empty.
fn next_directive(rx: &mut UnboundedReceiver<Packet>) -> Option<Packet> {
    rx.try_recv().ok()
}

/// Assert the next directive is a pairing pointing at `projector`.
fn expect_assigned(rx: &mut UnboundedReceiver<Packet>, projector: &str) {
    let packet = next_directive(rx).expect("expected a pairing directive");
    assert_eq!(packet.kind().unwrap(), MessageKind::ProjectorAssigned);
    let msg = ProjectorAssigned::from_bytes(packet.payload()).unwrap();
    assert_eq!(msg.projector_id.as_str(), projector);
}

/// Spin up a listener on an OS-assigned port and return its address.
async fn ephemeral_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

// ── Broker pairing scenarios ─────────────────────────────────────

#[test]
fn projector_then_client_pairs_immediately() {
    let mut broker = Broker::new();
    let (p1_tx, _p1_rx) = directive_channel();
    let (c1_tx, mut c1_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p1_tx);
    broker.client_ready(endpoint("C1"), c1_tx);

    expect_assigned(&mut c1_rx, "P1");
    assert_eq!(broker.queue_len(), 0);
}

#[test]
fn client_behind_active_pairing_waits_silently() {
    let mut broker = Broker::new();
    let (p1_tx, _p1_rx) = directive_channel();
    let (c1_tx, mut c1_rx) = directive_channel();
    let (c2_tx, mut c2_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p1_tx);
    broker.client_ready(endpoint("C1"), c1_tx);
    expect_assigned(&mut c1_rx, "P1");

    broker.client_ready(endpoint("C2"), c2_tx);
    let waiting: Vec<&EndpointId> = broker.queued().collect();
    assert_eq!(waiting, vec![&endpoint("C2")]);
    assert!(next_directive(&mut c2_rx).is_none());
}

#[test]
fn active_client_disconnect_promotes_queue_front() {
    let mut broker = Broker::new();
    let (p1_tx, mut p1_rx) = directive_channel();
    let (c1_tx, mut c1_rx) = directive_channel();
    let (c2_tx, mut c2_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p1_tx);
    broker.client_ready(endpoint("C1"), c1_tx);
    broker.client_ready(endpoint("C2"), c2_tx);
    expect_assigned(&mut c1_rx, "P1");

    broker.client_disconnected(&endpoint("C1"));

    let to_projector = next_directive(&mut p1_rx).expect("projector must be notified");
    assert_eq!(to_projector.kind().unwrap(), MessageKind::ClientGone);
    expect_assigned(&mut c2_rx, "P1");
    assert_eq!(broker.queue_len(), 0);
}

#[test]
fn projector_loss_displaces_client_to_queue_front() {
    let mut broker = Broker::new();
    let (p1_tx, _p1_rx) = directive_channel();
    let (c2_tx, mut c2_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p1_tx);
    broker.client_ready(endpoint("C2"), c2_tx);
    expect_assigned(&mut c2_rx, "P1");

    broker.projector_disconnected(&endpoint("P1"));

    let to_client = next_directive(&mut c2_rx).expect("client must be notified");
    assert_eq!(to_client.kind().unwrap(), MessageKind::ProjectorGone);
    let waiting: Vec<&EndpointId> = broker.queued().collect();
    assert_eq!(waiting, vec![&endpoint("C2")]);
    assert!(broker.projector_id().is_none());
    assert!(broker.active_client().is_none());
}

#[test]
fn replacement_projector_pairs_displaced_client() {
    let mut broker = Broker::new();
    let (p1_tx, _p1_rx) = directive_channel();
    let (c2_tx, mut c2_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p1_tx);
    broker.client_ready(endpoint("C2"), c2_tx);
    expect_assigned(&mut c2_rx, "P1");
    broker.projector_disconnected(&endpoint("P1"));
    let _ = next_directive(&mut c2_rx); // ProjectorGone

    let (p2_tx, _p2_rx) = directive_channel();
    broker.projector_ready(endpoint("P2"), p2_tx);

    expect_assigned(&mut c2_rx, "P2");
    assert_eq!(broker.queue_len(), 0);
}

#[test]
fn displaced_client_outranks_earlier_waiters() {
    // Requeue-at-front: a displaced active client gets the next
    // projector even though other clients were already waiting.
    let mut broker = Broker::new();
    let (p1_tx, _p1_rx) = directive_channel();
    let (c1_tx, mut c1_rx) = directive_channel();
    let (c2_tx, _c2_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p1_tx);
    broker.client_ready(endpoint("C1"), c1_tx);
    broker.client_ready(endpoint("C2"), c2_tx);
    expect_assigned(&mut c1_rx, "P1");

    broker.projector_disconnected(&endpoint("P1"));
    let waiting: Vec<&EndpointId> = broker.queued().collect();
    assert_eq!(waiting, vec![&endpoint("C1"), &endpoint("C2")]);
}

#[test]
fn role_resolution_covers_full_lifecycle() {
    let mut broker = Broker::new();
    let (p_tx, _p_rx) = directive_channel();
    let (c_tx, mut c_rx) = directive_channel();

    broker.projector_ready(endpoint("P1"), p_tx);
    broker.client_ready(endpoint("C1"), c_tx);
    expect_assigned(&mut c_rx, "P1");

    // A connection that never announced anything closes: nothing moves.
    broker.peer_closed(PeerRole::Unbound);
    assert_eq!(broker.active_client(), Some(&endpoint("C1")));

    broker.peer_closed(PeerRole::Projector(endpoint("P1")));
    assert!(broker.projector_id().is_none());
    let waiting: Vec<&EndpointId> = broker.queued().collect();
    assert_eq!(waiting, vec![&endpoint("C1")]);
}

// ── Frame pacing ─────────────────────────────────────────────────

#[test]
fn pacer_absorbs_overrun_by_half() {
    // A 60 ms encode+send cost against the default 40 ms period: the
    // period moves halfway toward the cost and the next cycle is
    // scheduled immediately.
    let mut pacer = FramePacer::new();
    let delay = pacer.complete_cycle(Duration::from_millis(60));
    assert_eq!(delay, Duration::ZERO);
    let period_ms = pacer.period().as_secs_f64() * 1000.0;
    assert!((period_ms - 50.0).abs() < 1e-6, "period = {period_ms}");
}

// ── Packet transport over TCP ────────────────────────────────────

#[tokio::test]
async fn control_packet_round_trip() {
    let (listener, addr) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut hub_conn = Connection::new(stream);
    let client_conn = client_handle.await.unwrap();

    let ready = ClientReady {
        client_id: endpoint("C1"),
    };
    client_conn
        .send(ready.clone().into_packet().unwrap())
        .await
        .unwrap();

    let packet = tokio::time::timeout(Duration::from_secs(5), hub_conn.recv())
        .await
        .expect("timeout")
        .expect("recv returned None");
    assert_eq!(packet.kind().unwrap(), MessageKind::ClientReady);
    assert_eq!(ClientReady::from_bytes(packet.payload()).unwrap(), ready);
}

#[tokio::test]
async fn heartbeats_never_reach_the_caller() {
    let (listener, addr) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut hub_conn = Connection::new(stream);
    let _client_conn = client_handle.await.unwrap();

    // The peer only emits heartbeats; recv must stay quiet.
    let result = tokio::time::timeout(Duration::from_millis(200), hub_conn.recv()).await;
    assert!(result.is_err(), "expected no application packets");
}

#[tokio::test]
async fn large_frame_payload_transfer() {
    let (listener, addr) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut projector_conn = Connection::new(stream);
    let client_conn = client_handle.await.unwrap();

    let frame = FrameRendered {
        frame: vec![0xAB; 1024 * 1024],
    };
    client_conn
        .send(frame.clone().into_packet().unwrap())
        .await
        .unwrap();

    let packet = tokio::time::timeout(Duration::from_secs(10), projector_conn.recv())
        .await
        .expect("timeout")
        .expect("recv returned None");
    assert_eq!(packet.kind().unwrap(), MessageKind::FrameRendered);
    let decoded = FrameRendered::from_bytes(packet.payload()).unwrap();
    assert_eq!(decoded.frame.len(), 1024 * 1024);
    assert_eq!(decoded.frame, frame.frame);
}

#[tokio::test]
async fn connection_drop_surfaces_as_none() {
    let (listener, addr) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut hub_conn = Connection::new(stream);
    let client_conn = client_handle.await.unwrap();

    drop(client_conn);

    let result = tokio::time::timeout(Duration::from_secs(5), hub_conn.recv())
        .await
        .expect("timeout");
    assert!(result.is_none());
}

#[tokio::test]
async fn unknown_kind_decodes_and_is_dispatchable() {
    // An unrecognized kind survives framing so dispatch can log and
    // drop it without touching the connection.
    let mut bytes = Packet::heartbeat().to_bytes();
    bytes[8..12].copy_from_slice(&0xDEAD_u32.to_le_bytes());
    let packet = Packet::from_bytes(&bytes).unwrap();
    assert!(packet.kind().is_err());
    assert_eq!(packet.raw_kind(), 0xDEAD);
}
