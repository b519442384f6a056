//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Traits for the coordinating chain's validator state and the per-validator
//! signature transport. Both are consumed, never implemented, by the core.

use std::collections::HashMap;

use async_trait::async_trait;
use shared_crypto::BlsSignature;
use shared_types::{DomainId, Height, NodeId};
use tokio_util::sync::CancellationToken;

use crate::domain::{RegisteredValidator, UnsignedMessage};
use crate::error::{AttestationError, WarpResult};

/// Height-addressed validator roster source - outbound port.
///
/// The coordinating chain is authoritative for stake. Implementations query
/// it (or a snapshot of it); any caching is theirs, the core derives a fresh
/// set per call.
#[async_trait]
pub trait ValidatorState: Send + Sync {
    /// Current reference height of the coordinating chain.
    async fn current_height(&self, cancel: CancellationToken) -> WarpResult<Height>;

    /// Validator roster for `domain` at `height`.
    async fn validator_set(
        &self,
        cancel: CancellationToken,
        height: Height,
        domain: DomainId,
    ) -> WarpResult<HashMap<NodeId, RegisteredValidator>>;
}

/// Per-validator signature fetcher - outbound port.
///
/// One call per validator per aggregation. Implementations must observe
/// `cancel` within bounded time rather than running the request to
/// completion.
#[async_trait]
pub trait SignatureClient: Send + Sync {
    /// Request `node`'s signature over `message`'s byte representation.
    async fn signature(
        &self,
        cancel: CancellationToken,
        node: NodeId,
        message: &UnsignedMessage,
    ) -> WarpResult<BlsSignature>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock validator state for testing.
#[derive(Clone, Default)]
pub struct MockValidatorState {
    /// Height to report.
    pub height: Height,
    /// Roster returned for any (height, domain) query.
    pub roster: HashMap<NodeId, RegisteredValidator>,
    /// Fail the height query?
    pub fail_height: bool,
    /// Fail the roster query?
    pub fail_roster: bool,
}

#[async_trait]
impl ValidatorState for MockValidatorState {
    async fn current_height(&self, _cancel: CancellationToken) -> WarpResult<Height> {
        if self.fail_height {
            return Err(AttestationError::ValidatorState {
                reason: "mock height failure".to_string(),
            });
        }
        Ok(self.height)
    }

    async fn validator_set(
        &self,
        _cancel: CancellationToken,
        _height: Height,
        _domain: DomainId,
    ) -> WarpResult<HashMap<NodeId, RegisteredValidator>> {
        if self.fail_roster {
            return Err(AttestationError::ValidatorState {
                reason: "mock roster failure".to_string(),
            });
        }
        Ok(self.roster.clone())
    }
}

/// Scripted per-node behavior for [`MockSignatureClient`].
pub enum MockSignatureResponse {
    /// Respond with this signature.
    Sign(BlsSignature),
    /// Fail the request.
    Error,
    /// Block until the request token fires, then report the cancellation.
    AwaitCancellation,
    /// Block until the request token fires, then respond with a valid
    /// signature anyway, as a slow validator whose reply crosses the
    /// cancellation on the wire would.
    SignAfterCancellation(BlsSignature),
}

/// Mock signature client for testing.
///
/// Drives controlled timing and cancellation scenarios; nodes scripted with
/// [`MockSignatureResponse::AwaitCancellation`] are recorded once their
/// token fires, so tests can assert that outstanding requests observed
/// cancellation.
#[derive(Default)]
pub struct MockSignatureClient {
    responses: HashMap<NodeId, MockSignatureResponse>,
    cancelled: parking_lot::Mutex<Vec<NodeId>>,
}

impl MockSignatureClient {
    /// Script `node` to behave as `response`.
    pub fn script(mut self, node: NodeId, response: MockSignatureResponse) -> Self {
        self.responses.insert(node, response);
        self
    }

    /// Nodes whose requests observed cancellation.
    pub fn cancelled_nodes(&self) -> Vec<NodeId> {
        self.cancelled.lock().clone()
    }
}

#[async_trait]
impl SignatureClient for MockSignatureClient {
    async fn signature(
        &self,
        cancel: CancellationToken,
        node: NodeId,
        _message: &UnsignedMessage,
    ) -> WarpResult<BlsSignature> {
        match self.responses.get(&node) {
            Some(MockSignatureResponse::Sign(signature)) => Ok(signature.clone()),
            Some(MockSignatureResponse::Error) | None => {
                Err(AttestationError::SignatureRequest {
                    reason: "mock request failure".to_string(),
                })
            }
            Some(MockSignatureResponse::AwaitCancellation) => {
                cancel.cancelled().await;
                self.cancelled.lock().push(node);
                Err(AttestationError::Cancelled)
            }
            Some(MockSignatureResponse::SignAfterCancellation(signature)) => {
                cancel.cancelled().await;
                self.cancelled.lock().push(node);
                Ok(signature.clone())
            }
        }
    }
}
