//! Ports: the attestation subsystem's API and SPI boundaries

pub mod inbound;
pub mod outbound;

pub use inbound::{AggregateSignatureResult, AttestationApi};
pub use outbound::{
    MockSignatureClient, MockSignatureResponse, MockValidatorState, SignatureClient,
    ValidatorState,
};
