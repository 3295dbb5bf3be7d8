//! # Quorum Arithmetic
//!
//! A quorum is `numerator / 100` of total tracked weight. The comparison is
//! done in `u128` so no combination of `u64` weights can overflow.

use super::errors::AggregationError;

/// Implicit quorum denominator.
pub const QUORUM_DENOMINATOR: u64 = 100;

/// Default quorum numerator (67%).
pub const DEFAULT_QUORUM_NUMERATOR: u64 = 67;

/// Validated quorum fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuorumThreshold {
    numerator: u64,
}

impl QuorumThreshold {
    /// Accepts numerators in `1..=100`.
    pub fn new(numerator: u64) -> Result<Self, AggregationError> {
        if numerator == 0 || numerator > QUORUM_DENOMINATOR {
            return Err(AggregationError::InvalidQuorum(numerator));
        }
        Ok(Self { numerator })
    }

    pub fn numerator(self) -> u64 {
        self.numerator
    }

    /// `signed × 100 ≥ total × numerator`.
    pub fn is_met(self, signed_weight: u64, total_weight: u64) -> bool {
        u128::from(signed_weight) * u128::from(QUORUM_DENOMINATOR)
            >= u128::from(total_weight) * u128::from(self.numerator)
    }

    /// Smallest weight that satisfies the quorum.
    pub fn required_weight(self, total_weight: u64) -> u64 {
        let num = u128::from(total_weight) * u128::from(self.numerator);
        let den = u128::from(QUORUM_DENOMINATOR);
        // numerator <= denominator, so the result never exceeds total_weight
        num.div_ceil(den) as u64
    }
}

impl Default for QuorumThreshold {
    fn default() -> Self {
        Self {
            numerator: DEFAULT_QUORUM_NUMERATOR,
        }
    }
}
