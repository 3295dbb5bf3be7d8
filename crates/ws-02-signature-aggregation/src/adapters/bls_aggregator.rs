//! BLS Crypto Aggregator Adapter
//!
//! Implements `CryptoAggregator` with blst.

use crate::domain::{
    aggregate_shares, AttemptFailure, BitSetSignature, CanonicalValidatorSet, QuorumThreshold,
    SignatureShare,
};
use crate::ports::outbound::CryptoAggregator;

/// blst-backed aggregator. Share verification runs on the rayon pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlsCryptoAggregator;

impl BlsCryptoAggregator {
    pub fn new() -> Self {
        Self
    }
}

impl CryptoAggregator for BlsCryptoAggregator {
    fn aggregate(
        &self,
        message: &[u8],
        validators: &CanonicalValidatorSet,
        shares: &[SignatureShare],
        quorum: QuorumThreshold,
    ) -> Result<BitSetSignature, AttemptFailure> {
        aggregate_shares(message, validators, shares, quorum)
    }
}
