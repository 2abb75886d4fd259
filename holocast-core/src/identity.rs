//! Endpoint identity.
//!
//! Clients and projectors identify themselves with opaque,
//! collision-resistant string ids minted at startup. The hub never
//! parses them — they are map keys on the control plane and rendezvous
//! keys on the data plane, nothing more.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a client or projector endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    /// Mint a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EndpointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EndpointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = EndpointId::generate();
        let b = EndpointId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_matches_inner() {
        let id = EndpointId::from("projector-1");
        assert_eq!(id.to_string(), "projector-1");
        assert_eq!(id.as_str(), "projector-1");
    }
}
