//! Aggregate signature with signer bitmap

use bitvec::prelude::*;
use shared_crypto::BlsSignature;

/// A combined BLS signature plus the bitmap of canonical validator indices
/// that produced it.
///
/// Bit `i` set means the validator at canonical index `i` contributed. The
/// bitmap is only meaningful relative to the exact canonical set it was
/// built against; verification re-derives that set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateSignature {
    /// Combined signature over the message bytes.
    pub signature: BlsSignature,
    /// Contribution bitmap over canonical indices.
    pub signers: BitVec<u8, Msb0>,
}

impl AggregateSignature {
    /// Wrap a combined signature and its signer bitmap.
    pub fn new(signature: BlsSignature, signers: BitVec<u8, Msb0>) -> Self {
        Self { signature, signers }
    }

    /// Number of contributing validators.
    pub fn num_signers(&self) -> usize {
        self.signers.count_ones()
    }

    /// Indices of contributing validators, ascending.
    pub fn signer_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.signers.iter_ones()
    }

    /// Whether the validator at `index` contributed.
    pub fn has_signer(&self, index: usize) -> bool {
        self.signers.get(index).map(|bit| *bit).unwrap_or(false)
    }

    /// Bitmap as wire bytes (bit 0 = most significant bit of byte 0,
    /// zero-padded to the byte boundary).
    pub fn signers_bytes(&self) -> Vec<u8> {
        let mut padded = self.signers.clone();
        padded.set_uninitialized(false);
        padded.into_vec()
    }
}
