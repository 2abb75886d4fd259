//! Managed TCP connections for holocast endpoints.

pub mod connection;

pub use connection::{Connection, ConnectionSender};
