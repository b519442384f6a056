//! Adapters implementing the outbound ports

pub mod signature_client;
pub mod validator_state;

pub use signature_client::LocalSignerClient;
pub use validator_state::StaticValidatorState;
