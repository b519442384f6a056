//! # Shared Crypto - Signature Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `bls` | BLS12-381 (min_pk) | Validator signatures and aggregation |
//! | `hashing` | SHA-256 | Message content identifiers |
//!
//! ## Security Properties
//!
//! - **BLS12-381**: 48-byte compressed public keys, 96-byte signatures,
//!   Ethereum 2.0 compatible domain separation tag
//! - **Aggregation**: n signatures over the same message combine into one
//!   signature verifiable against the aggregated public key
//! - **SHA-256**: content addressing only, no MAC use

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bls;
pub mod errors;
pub mod hashing;

// Re-exports
pub use bls::{BlsKeyPair, BlsPublicKey, BlsSignature, PUBLIC_KEY_LEN, SIGNATURE_LEN};
pub use errors::CryptoError;
pub use hashing::{sha256, Sha256Hasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
