//! Attestation Service - Core orchestration
//!
//! One aggregation call: derive the canonical validator set, fan out one
//! signature request per validator under a shared cancellation scope, fold
//! responses through a single-consumer funnel, and stop the moment the
//! quorum threshold is crossed. Verification is the inverse: re-derive the
//! set at a caller-supplied height and check the bitmap, the combined
//! signature, and the weight.

use std::sync::Arc;

use async_trait::async_trait;
use bitvec::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shared_crypto::{BlsPublicKey, BlsSignature};
use shared_types::{DomainId, Height, Weight};

use crate::domain::{
    meets_quorum, AggregateSignature, SignedMessage, UnsignedMessage, ValidatorSet,
};
use crate::error::{AttestationError, WarpResult};
use crate::ports::inbound::{AggregateSignatureResult, AttestationApi};
use crate::ports::outbound::{SignatureClient, ValidatorState};

/// Attestation service over a validator state source and a signature
/// transport.
///
/// Holds no state across calls; every invocation derives its validator set
/// fresh and leaves nothing behind.
pub struct AttestationService<S, C>
where
    S: ValidatorState,
    C: SignatureClient,
{
    validator_state: Arc<S>,
    signature_client: Arc<C>,
}

impl<S, C> AttestationService<S, C>
where
    S: ValidatorState + 'static,
    C: SignatureClient + 'static,
{
    /// Create a new service over its two outbound ports.
    pub fn new(validator_state: Arc<S>, signature_client: Arc<C>) -> Self {
        Self {
            validator_state,
            signature_client,
        }
    }

    /// Fetch and canonicalize the validator set for `domain` at `height`.
    async fn canonical_set(
        &self,
        cancel: CancellationToken,
        height: Height,
        domain: DomainId,
    ) -> WarpResult<ValidatorSet> {
        let roster = self
            .validator_state
            .validator_set(cancel, height, domain)
            .await?;
        ValidatorSet::canonicalize(&roster)
    }
}

#[async_trait]
impl<S, C> AttestationApi for AttestationService<S, C>
where
    S: ValidatorState + 'static,
    C: SignatureClient + 'static,
{
    async fn aggregate_signatures(
        &self,
        cancel: CancellationToken,
        message: &UnsignedMessage,
        quorum_numerator: u64,
        quorum_denominator: u64,
    ) -> WarpResult<AggregateSignatureResult> {
        let height = self.validator_state.current_height(cancel.clone()).await?;
        let set = self
            .canonical_set(cancel.clone(), height, message.origin_domain())
            .await?;
        let total_weight = set.total_weight();
        let message_bytes = message.bytes();

        info!(
            "[warp] aggregating signatures for message {} at height {}: {} validators, total weight {}",
            hex::encode(&message.id()[..8]),
            height,
            set.len(),
            total_weight
        );

        // One request per canonical entry, each under its own child of the
        // fan-out token. Threshold-met cancels the fan-out scope only; the
        // caller's token cancels everything through it.
        let fanout = cancel.child_token();
        let (tx, mut rx) = mpsc::channel::<(usize, WarpResult<BlsSignature>)>(set.len());
        for (index, validator) in set.validators().iter().enumerate() {
            let client = Arc::clone(&self.signature_client);
            let request_token = fanout.child_token();
            let node = validator.node_ids[0];
            let request_message = message.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = client
                    .signature(request_token, node, &request_message)
                    .await;
                // The receiver drops once the call resolves; late responses
                // are discarded here.
                let _ = tx.send((index, response)).await;
            });
        }
        drop(tx);

        let mut collected: Vec<BlsSignature> = Vec::new();
        let mut signers = bitvec![u8, Msb0; 0; set.len()];
        let mut accumulated: Weight = 0;
        let mut completed = 0usize;

        while completed < set.len() {
            let (index, response) = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    fanout.cancel();
                    debug!("[warp] aggregation cancelled by caller");
                    return Err(AttestationError::Cancelled);
                }
                received = rx.recv() => match received {
                    Some(pair) => pair,
                    None => break,
                },
            };
            completed += 1;

            let validator = match set.get(index) {
                Some(validator) => validator,
                None => continue,
            };
            let signature = match response {
                Ok(signature) => signature,
                Err(err) => {
                    debug!(
                        "[warp] validator {} ({}) did not contribute: {}",
                        index, validator.node_ids[0], err
                    );
                    continue;
                }
            };
            if !validator.public_key.verify(&message_bytes, &signature) {
                warn!(
                    "[warp] dropping invalid signature from validator {} ({})",
                    index, validator.node_ids[0]
                );
                continue;
            }
            if signers[index] {
                continue;
            }

            signers.set(index, true);
            collected.push(signature);
            accumulated = accumulated.saturating_add(validator.weight);
            debug!(
                "[warp] accepted signature from validator {}: weight {}/{}",
                index, accumulated, total_weight
            );

            if meets_quorum(accumulated, total_weight, quorum_numerator, quorum_denominator) {
                fanout.cancel();
                break;
            }
        }

        if !meets_quorum(accumulated, total_weight, quorum_numerator, quorum_denominator) {
            warn!(
                "[warp] quorum {}/{} not reached: weight {}/{}",
                quorum_numerator, quorum_denominator, accumulated, total_weight
            );
            return Err(AttestationError::InsufficientWeight {
                accumulated,
                total: total_weight,
            });
        }

        let signature = BlsSignature::aggregate(&collected)?;
        info!(
            "[warp] quorum reached: {} signers, weight {}/{}",
            collected.len(),
            accumulated,
            total_weight
        );

        Ok(AggregateSignatureResult {
            message: SignedMessage {
                message: message.clone(),
                signature: AggregateSignature::new(signature, signers),
            },
            signature_weight: accumulated,
            total_weight,
        })
    }

    async fn verify_quorum(
        &self,
        signed: &SignedMessage,
        quorum_numerator: u64,
        quorum_denominator: u64,
        height: Height,
    ) -> WarpResult<()> {
        let message = &signed.message;
        let aggregate = &signed.signature;
        let set = self
            .canonical_set(CancellationToken::new(), height, message.origin_domain())
            .await?;

        // The bitmap is only meaningful against a set of the width it was
        // built for.
        let expected_bytes = set.len().div_ceil(8);
        let actual_bytes = aggregate.signers.len().div_ceil(8);
        if actual_bytes != expected_bytes {
            return Err(AttestationError::InvalidBitmap {
                reason: format!(
                    "bitmap spans {actual_bytes} bytes, validator set of {} needs {expected_bytes}",
                    set.len()
                ),
            });
        }

        let mut keys: Vec<BlsPublicKey> = Vec::with_capacity(aggregate.num_signers());
        let mut signature_weight: Weight = 0;
        for index in aggregate.signer_indices() {
            let Some(validator) = set.get(index) else {
                return Err(AttestationError::InvalidBitmap {
                    reason: format!(
                        "signer index {index} beyond validator set of {}",
                        set.len()
                    ),
                });
            };
            keys.push(validator.public_key.clone());
            signature_weight = signature_weight.saturating_add(validator.weight);
        }
        if keys.is_empty() {
            return Err(AttestationError::InvalidBitmap {
                reason: "no signers marked".to_string(),
            });
        }

        let aggregate_key = BlsPublicKey::aggregate(&keys)?;
        if !aggregate_key.verify(&message.bytes(), &aggregate.signature) {
            return Err(AttestationError::InvalidAggregateSignature);
        }

        if !meets_quorum(
            signature_weight,
            set.total_weight(),
            quorum_numerator,
            quorum_denominator,
        ) {
            return Err(AttestationError::InsufficientWeight {
                accumulated: signature_weight,
                total: set.total_weight(),
            });
        }

        debug!(
            "[warp] verified quorum for message {}: weight {}/{}",
            hex::encode(&message.id()[..8]),
            signature_weight,
            set.total_weight()
        );
        Ok(())
    }
}
