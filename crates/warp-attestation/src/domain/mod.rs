//! Domain layer: messages, validator sets, quorum arithmetic

pub mod message;
pub mod quorum;
pub mod signature;
pub mod validator;

pub use message::{SignedMessage, UnsignedMessage};
pub use quorum::{
    meets_quorum, QuorumFraction, DEFAULT_QUORUM_NUMERATOR, MIN_QUORUM_NUMERATOR,
    QUORUM_DENOMINATOR,
};
pub use signature::AggregateSignature;
pub use validator::{RegisteredValidator, Validator, ValidatorSet};
