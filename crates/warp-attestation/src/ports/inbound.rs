//! Driving Ports (API - Inbound)

use async_trait::async_trait;
use shared_types::{Height, Weight};
use tokio_util::sync::CancellationToken;

use crate::domain::{SignedMessage, UnsignedMessage};
use crate::error::WarpResult;

/// Outcome of a successful aggregation call.
#[derive(Clone, Debug)]
pub struct AggregateSignatureResult {
    /// The message carrying its aggregate signature.
    pub message: SignedMessage,
    /// Summed weight of the contributing validators.
    pub signature_weight: Weight,
    /// Total weight of the validator set at aggregation time.
    pub total_weight: Weight,
}

/// Primary attestation API.
///
/// The two halves of the quorum-certificate protocol: produce an aggregate
/// signature for a message, and verify one produced earlier - possibly by a
/// different process.
#[async_trait]
pub trait AttestationApi: Send + Sync {
    /// Solicit signatures from the message's validator set until the quorum
    /// fraction `quorum_numerator / quorum_denominator` of total stake is
    /// reached, then combine them.
    ///
    /// Cancelling `cancel` aborts the call and every outstanding request.
    async fn aggregate_signatures(
        &self,
        cancel: CancellationToken,
        message: &UnsignedMessage,
        quorum_numerator: u64,
        quorum_denominator: u64,
    ) -> WarpResult<AggregateSignatureResult>;

    /// Check a received signed message against the validator set derived at
    /// `height` and the quorum fraction.
    async fn verify_quorum(
        &self,
        signed: &SignedMessage,
        quorum_numerator: u64,
        quorum_denominator: u64,
        height: Height,
    ) -> WarpResult<()>;
}
