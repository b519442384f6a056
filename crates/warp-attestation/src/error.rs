//! Error types for the attestation subsystem

use shared_crypto::CryptoError;
use shared_types::Weight;
use thiserror::Error;

/// Attestation subsystem errors
#[derive(Debug, Error)]
pub enum AttestationError {
    /// Validator state query failed (height or roster retrieval)
    #[error("Validator state query failed: {reason}")]
    ValidatorState {
        /// What the state source reported
        reason: String,
    },

    /// No validators with usable keys at the requested height
    #[error("No validators to aggregate signatures from")]
    NoValidators,

    /// Accumulated signature weight never reached the quorum threshold
    #[error("Insufficient signature weight: accumulated {accumulated} of {total}")]
    InsufficientWeight {
        /// Weight of the validators that contributed valid signatures
        accumulated: Weight,
        /// Total weight of the validator set
        total: Weight,
    },

    /// The aggregation call was cancelled before a verdict was reached
    #[error("Signature aggregation cancelled")]
    Cancelled,

    /// Rejected quorum configuration
    #[error("Invalid quorum configuration: {reason}")]
    InvalidQuorum {
        /// Which constraint the configuration violates
        reason: String,
    },

    /// Signer bitmap does not match the validator set it indexes into
    #[error("Invalid signer bitmap: {reason}")]
    InvalidBitmap {
        /// Which bitmap constraint was violated
        reason: String,
    },

    /// Combined signature failed verification against the signer subset
    #[error("Invalid aggregate signature")]
    InvalidAggregateSignature,

    /// Wire bytes failed to parse
    #[error("Malformed signed message: {reason}")]
    MalformedMessage {
        /// What the parser rejected
        reason: String,
    },

    /// Signature request to a single validator failed.
    ///
    /// Soft during aggregation: recorded as non-participation, never the
    /// call's final error.
    #[error("Signature request failed: {reason}")]
    SignatureRequest {
        /// Transport-level failure description
        reason: String,
    },

    /// Underlying cryptographic failure
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Result type for attestation operations
pub type WarpResult<T> = Result<T, AttestationError>;
