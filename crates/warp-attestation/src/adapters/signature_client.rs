//! Signature Client Adapter
//!
//! Implements the `SignatureClient` port with an in-process signer registry.
//! Each registered node signs with its own key pair on request; marking a
//! node offline injects the transport failures a real network produces.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::{BlsKeyPair, BlsSignature};
use shared_types::NodeId;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::UnsignedMessage;
use crate::error::{AttestationError, WarpResult};
use crate::ports::outbound::SignatureClient;

/// In-process signer registry.
pub struct LocalSignerClient {
    signers: RwLock<HashMap<NodeId, BlsKeyPair>>,
    offline: RwLock<HashSet<NodeId>>,
}

impl LocalSignerClient {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            signers: RwLock::new(HashMap::new()),
            offline: RwLock::new(HashSet::new()),
        }
    }

    /// Builder: register `node` with its signing key pair.
    pub fn with_signer(self, node: NodeId, keypair: BlsKeyPair) -> Self {
        self.register(node, keypair);
        self
    }

    /// Register `node` with its signing key pair.
    pub fn register(&self, node: NodeId, keypair: BlsKeyPair) {
        self.signers.write().insert(node, keypair);
    }

    /// Make requests to `node` fail until it is brought back.
    pub fn set_offline(&self, node: NodeId) {
        self.offline.write().insert(node);
    }

    /// Clear an offline mark.
    pub fn set_online(&self, node: NodeId) {
        self.offline.write().remove(&node);
    }
}

impl Default for LocalSignerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureClient for LocalSignerClient {
    async fn signature(
        &self,
        _cancel: CancellationToken,
        node: NodeId,
        message: &UnsignedMessage,
    ) -> WarpResult<BlsSignature> {
        if self.offline.read().contains(&node) {
            return Err(AttestationError::SignatureRequest {
                reason: format!("node {node} offline"),
            });
        }
        let signers = self.signers.read();
        let Some(keypair) = signers.get(&node) else {
            return Err(AttestationError::SignatureRequest {
                reason: format!("no signing key registered for node {node}"),
            });
        };
        debug!("[warp] signing message {} as {}", hex::encode(&message.id()[..8]), node);
        Ok(keypair.sign(&message.bytes()))
    }
}
