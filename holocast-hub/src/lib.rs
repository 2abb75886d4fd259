//! # holocast-hub
//!
//! The hub hosts the two halves of the signaling system:
//!
//! - **control plane** — every endpoint keeps a long-lived connection
//!   here; the session broker pairs projectors and clients over it;
//! - **data plane** — paired endpoints open tunnel connections that
//!   the rendezvous relay splices together, after which the broker has
//!   no part in their traffic.

pub mod config;
pub mod control;
pub mod relay;

pub use config::HubConfig;
pub use control::{BrokerEvent, run_broker, run_control_plane};
pub use relay::{Relay, run_relay};
