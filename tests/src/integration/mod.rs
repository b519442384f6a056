//! Protocol choreography tests
//!
//! Shared fixtures: a weighted validator world with real BLS keys, a mock
//! validator state reporting it, and per-scenario scripted signature
//! clients.

pub mod aggregation_flows;

use std::collections::HashMap;
use std::sync::Arc;

use shared_crypto::{BlsKeyPair, BlsSignature};
use shared_types::{DomainId, Height, NodeId, Weight};
use warp_attestation::{
    AttestationService, MockSignatureClient, MockValidatorState, RegisteredValidator,
    UnsignedMessage, ValidatorSet,
};

/// Reference height every mock state reports.
pub const HEIGHT: Height = 1337;

pub fn node(n: u8) -> NodeId {
    NodeId([n; 32])
}

pub fn domain(n: u8) -> DomainId {
    DomainId([n; 32])
}

/// The message all scenarios attest to.
pub fn message() -> UnsignedMessage {
    UnsignedMessage::new(domain(1), domain(2), b"hello world".to_vec())
}

/// A validator world: key pairs, node ids, and the roster they form.
pub struct Fixture {
    pub keypairs: Vec<BlsKeyPair>,
    pub nodes: Vec<NodeId>,
    pub roster: HashMap<NodeId, RegisteredValidator>,
}

impl Fixture {
    /// One single-node validator per weight, nodes numbered from 1.
    pub fn with_weights(weights: &[Weight]) -> Self {
        let keypairs: Vec<BlsKeyPair> = weights.iter().map(|_| BlsKeyPair::generate()).collect();
        let nodes: Vec<NodeId> = (0..weights.len()).map(|i| node(i as u8 + 1)).collect();
        let roster = nodes
            .iter()
            .zip(&keypairs)
            .zip(weights)
            .map(|((node, keypair), weight)| {
                (*node, RegisteredValidator::new(keypair.public_key(), *weight))
            })
            .collect();
        Self {
            keypairs,
            nodes,
            roster,
        }
    }

    /// Mock state reporting this roster at [`HEIGHT`].
    pub fn state(&self) -> MockValidatorState {
        MockValidatorState {
            height: HEIGHT,
            roster: self.roster.clone(),
            ..Default::default()
        }
    }

    /// Validator `i`'s signature over the fixture message.
    pub fn signature(&self, i: usize) -> BlsSignature {
        self.keypairs[i].sign(&message().bytes())
    }

    /// Canonical bitmap index of validator `i`.
    pub fn canonical_index(&self, i: usize) -> usize {
        ValidatorSet::canonicalize(&self.roster)
            .unwrap()
            .index_of(&self.keypairs[i].public_key())
            .unwrap()
    }
}

/// Service over shared mocks, keeping the client handle for assertions.
pub fn service_over(
    state: MockValidatorState,
    client: Arc<MockSignatureClient>,
) -> AttestationService<MockValidatorState, MockSignatureClient> {
    AttestationService::new(Arc::new(state), client)
}

/// Wait until `predicate` holds, yielding to the scheduler between polls.
pub async fn eventually(mut predicate: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if predicate() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after 10000 polls");
}

/// Install the test log subscriber; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
