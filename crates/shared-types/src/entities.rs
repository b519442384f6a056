//! # Core Domain Entities
//!
//! Identifier and weight primitives for the attestation layer.
//!
//! ## Clusters
//!
//! - **Chain context**: `DomainId`, `Height`
//! - **Networking**: `NodeId`
//! - **Stake**: `Weight`
//! - **Content addressing**: `Hash`

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A block height on the coordinating chain.
pub type Height = u64;

/// Validator stake weight.
pub type Weight = u64;

/// Identifier for a chain context (the origin or destination of a message).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct DomainId(pub [u8; 32]);

impl DomainId {
    /// Create from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for DomainId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Unique identifier for a node in the network.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    /// Create from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for NodeId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
