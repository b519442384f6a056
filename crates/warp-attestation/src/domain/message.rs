//! Cross-subnet messages and their wire representation
//!
//! Wire layout of a signed message:
//!
//! ```text
//! origin_domain (32) || destination_domain (32) ||
//! payload_len (u32 BE) || payload ||
//! bitmap_len (u32 BE) || signer bitmap (Msb0, zero-padded) ||
//! combined signature (96, compressed)
//! ```
//!
//! The prefix up to and including the payload is the signing target; both
//! sides of the protocol must produce it byte-for-byte identically.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, BlsSignature, SIGNATURE_LEN};
use shared_types::{DomainId, Hash};

use super::signature::AggregateSignature;
use crate::error::{AttestationError, WarpResult};

/// An unsigned cross-subnet message. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedMessage {
    origin_domain: DomainId,
    destination_domain: DomainId,
    payload: Vec<u8>,
}

impl UnsignedMessage {
    /// Construct a message bound for `destination_domain`.
    pub fn new(origin_domain: DomainId, destination_domain: DomainId, payload: Vec<u8>) -> Self {
        Self {
            origin_domain,
            destination_domain,
            payload,
        }
    }

    /// Domain the message originates from; its validator set attests.
    pub fn origin_domain(&self) -> DomainId {
        self.origin_domain
    }

    /// Domain the message is addressed to.
    pub fn destination_domain(&self) -> DomainId {
        self.destination_domain
    }

    /// Opaque payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Deterministic byte representation; this is what validators sign.
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 + 32 + 4 + self.payload.len());
        bytes.extend_from_slice(self.origin_domain.as_bytes());
        bytes.extend_from_slice(self.destination_domain.as_bytes());
        bytes.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Content identifier: SHA-256 of the byte representation.
    pub fn id(&self) -> Hash {
        sha256(&self.bytes())
    }
}

/// A message plus the aggregate signature attesting to it. The durable,
/// transmissible artifact of the protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    /// The attested message.
    pub message: UnsignedMessage,
    /// Aggregate signature and signer bitmap.
    pub signature: AggregateSignature,
}

impl SignedMessage {
    /// Serialize to the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let bitmap = self.signature.signers_bytes();
        let mut bytes = self.message.bytes();
        bytes.reserve(4 + bitmap.len() + SIGNATURE_LEN);
        bytes.extend_from_slice(&(bitmap.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&bitmap);
        bytes.extend_from_slice(&self.signature.signature.to_bytes());
        bytes
    }

    /// Parse the wire layout, rejecting truncated or trailing input.
    pub fn from_bytes(bytes: &[u8]) -> WarpResult<Self> {
        let mut reader = Reader::new(bytes);

        let origin_domain = DomainId(reader.take_array::<32>("origin domain")?);
        let destination_domain = DomainId(reader.take_array::<32>("destination domain")?);
        let payload_len = reader.take_u32("payload length")? as usize;
        let payload = reader.take("payload", payload_len)?.to_vec();

        let bitmap_len = reader.take_u32("bitmap length")? as usize;
        let bitmap = reader.take("signer bitmap", bitmap_len)?.to_vec();
        let signature_bytes = reader.take_array::<SIGNATURE_LEN>("signature")?;
        reader.finish()?;

        let signature = BlsSignature::from_bytes(&signature_bytes)
            .map_err(|_| AttestationError::MalformedMessage {
                reason: "signature bytes are not a curve point".to_string(),
            })?;
        let signers = BitVec::<u8, Msb0>::from_vec(bitmap);

        Ok(Self {
            message: UnsignedMessage::new(origin_domain, destination_domain, payload),
            signature: AggregateSignature::new(signature, signers),
        })
    }
}

/// Cursor over wire bytes with typed, bounds-checked reads.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, field: &str, len: usize) -> WarpResult<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.bytes.len());
        let Some(end) = end else {
            return Err(AttestationError::MalformedMessage {
                reason: format!("truncated at {field}"),
            });
        };
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, field: &str) -> WarpResult<[u8; N]> {
        let slice = self.take(field, N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(slice);
        Ok(array)
    }

    fn take_u32(&mut self, field: &str) -> WarpResult<u32> {
        Ok(u32::from_be_bytes(self.take_array::<4>(field)?))
    }

    fn finish(&self) -> WarpResult<()> {
        if self.offset != self.bytes.len() {
            return Err(AttestationError::MalformedMessage {
                reason: format!("{} trailing bytes", self.bytes.len() - self.offset),
            });
        }
        Ok(())
    }
}
