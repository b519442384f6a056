//! Quorum fraction configuration and weight arithmetic
//!
//! The threshold check is shared by both halves of the protocol and uses
//! cross-multiplication in u128 so no weight distribution can round or
//! overflow its way past a quorum.

use serde::{Deserialize, Serialize};
use shared_types::Weight;

use crate::error::{AttestationError, WarpResult};

/// Denominator every quorum fraction is expressed against.
pub const QUORUM_DENOMINATOR: u64 = 100;

/// Lowest numerator a configuration may specify.
pub const MIN_QUORUM_NUMERATOR: u64 = 33;

/// Numerator applied when a configuration leaves the quorum unset.
pub const DEFAULT_QUORUM_NUMERATOR: u64 = 67;

/// A validated quorum fraction.
///
/// Validation happens here, at configuration time; the aggregation and
/// verification loops take the raw numerator/denominator and never clamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumFraction {
    numerator: u64,
    denominator: u64,
}

impl QuorumFraction {
    /// Validate and construct a quorum fraction.
    pub fn new(numerator: u64, denominator: u64) -> WarpResult<Self> {
        if denominator == 0 {
            return Err(AttestationError::InvalidQuorum {
                reason: "quorum denominator can not be zero".to_string(),
            });
        }
        if numerator > denominator {
            return Err(AttestationError::InvalidQuorum {
                reason: format!(
                    "quorum numerator ({numerator}) can not be greater than quorum denominator ({denominator})"
                ),
            });
        }
        // Minimum is defined against QUORUM_DENOMINATOR; scale before comparing.
        let scaled_minimum = (MIN_QUORUM_NUMERATOR as u128) * (denominator as u128);
        if (numerator as u128) * (QUORUM_DENOMINATOR as u128) < scaled_minimum {
            return Err(AttestationError::InvalidQuorum {
                reason: format!(
                    "quorum numerator ({numerator}/{denominator}) below minimum ({MIN_QUORUM_NUMERATOR}/{QUORUM_DENOMINATOR})"
                ),
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Minimum weight share required, as a numerator over `denominator()`.
    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    /// Denominator of the fraction.
    pub fn denominator(&self) -> u64 {
        self.denominator
    }
}

impl Default for QuorumFraction {
    fn default() -> Self {
        Self {
            numerator: DEFAULT_QUORUM_NUMERATOR,
            denominator: QUORUM_DENOMINATOR,
        }
    }
}

/// Threshold check: `accumulated / total >= numerator / denominator`,
/// evaluated as `accumulated * denominator >= total * numerator`.
pub fn meets_quorum(
    accumulated: Weight,
    total: Weight,
    numerator: u64,
    denominator: u64,
) -> bool {
    (accumulated as u128) * (denominator as u128) >= (total as u128) * (numerator as u128)
}
