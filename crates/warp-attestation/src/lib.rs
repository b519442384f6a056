//! # Warp Attestation
//!
//! Quorum attestation for cross-subnet messaging: aggregate BLS signatures
//! from a stake-weighted validator set over an arbitrary message, and verify
//! the resulting certificate later without re-contacting the validators.
//!
//! ## Purpose
//!
//! - Solicit signatures concurrently and stop at the quorum threshold
//! - Merge validators sharing a signing key before aggregation
//! - Emit one combined signature plus a canonical signer bitmap
//! - Re-derive the validator set and verify a received certificate
//!
//! ## Module Structure
//!
//! ```text
//! warp-attestation/
//! ├── domain/          # Messages, validator sets, quorum arithmetic
//! ├── ports/           # AttestationApi, ValidatorState, SignatureClient
//! ├── adapters/        # Snapshot state source, in-process signer
//! └── service.rs       # Aggregation + verification orchestration
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{LocalSignerClient, StaticValidatorState};
pub use domain::{
    meets_quorum, AggregateSignature, QuorumFraction, RegisteredValidator, SignedMessage,
    UnsignedMessage, Validator, ValidatorSet, DEFAULT_QUORUM_NUMERATOR, MIN_QUORUM_NUMERATOR,
    QUORUM_DENOMINATOR,
};
pub use error::{AttestationError, WarpResult};
pub use ports::{
    AggregateSignatureResult, AttestationApi, MockSignatureClient, MockSignatureResponse,
    MockValidatorState, SignatureClient, ValidatorState,
};
pub use service::AttestationService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
