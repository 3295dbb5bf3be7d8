//! # Aggregation Errors
//!
//! [`AttemptFailure`] is recoverable: the retry loop logs it and starts a
//! fresh attempt. [`AggregationError`] is terminal for a run.

use std::time::Duration;
use thiserror::Error;
use ws_01_message_derivation::CodecError;

/// Why a single aggregation attempt did not produce a signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The validator set could not be fetched or is malformed.
    #[error("Invalid validator set: {0}")]
    ValidatorSet(String),

    /// The tracked validator set carries no weight.
    #[error("Validator set has zero total weight")]
    ZeroTotalWeight,

    /// Verified shares do not reach the quorum threshold.
    #[error("Insufficient weight: signed {signed} of {total}, need {quorum_numerator}%")]
    InsufficientWeight {
        signed: u64,
        total: u64,
        quorum_numerator: u64,
    },

    /// Transport failure while contacting peers.
    #[error("Peer network error: {0}")]
    Network(String),

    /// The attempt exceeded its time bound.
    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Combining shares failed.
    #[error("Signature aggregation failed: {0}")]
    Aggregation(String),

    /// The combined signature did not verify.
    #[error("Aggregate signature failed verification")]
    InvalidAggregate,
}

impl AttemptFailure {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AttemptFailure::ValidatorSet(_) => "validator_set",
            AttemptFailure::ZeroTotalWeight => "zero_weight",
            AttemptFailure::InsufficientWeight { .. } => "insufficient_weight",
            AttemptFailure::Network(_) => "network",
            AttemptFailure::Timeout(_) => "timeout",
            AttemptFailure::Aggregation(_) => "aggregation",
            AttemptFailure::InvalidAggregate => "invalid_aggregate",
        }
    }
}

/// Terminal aggregation failures.
#[derive(Debug, Clone, Error)]
pub enum AggregationError {
    /// Peer network configuration or setup failed before any attempt ran.
    #[error("Peer network setup failed: {0}")]
    NetworkSetup(String),

    /// Quorum numerator outside `1..=100`.
    #[error("Invalid quorum numerator: {0} (must be 1..=100)")]
    InvalidQuorum(u64),

    /// Retry policy cannot run a single attempt.
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(&'static str),

    /// Message could not be encoded.
    #[error("Failed to encode message: {0}")]
    Encoding(#[from] CodecError),

    /// Every attempt failed.
    #[error("Quorum not reached after {attempts} attempts")]
    QuorumNotReached {
        attempts: u32,
        #[source]
        last: AttemptFailure,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_reasons_are_distinct() {
        let failures = [
            AttemptFailure::ValidatorSet(String::new()),
            AttemptFailure::ZeroTotalWeight,
            AttemptFailure::InsufficientWeight {
                signed: 0,
                total: 0,
                quorum_numerator: 0,
            },
            AttemptFailure::Network(String::new()),
            AttemptFailure::Timeout(Duration::ZERO),
            AttemptFailure::Aggregation(String::new()),
            AttemptFailure::InvalidAggregate,
        ];
        let mut reasons: Vec<_> = failures.iter().map(|f| f.reason()).collect();
        reasons.sort_unstable();
        reasons.dedup();
        assert_eq!(reasons.len(), failures.len());
    }

    #[test]
    fn test_quorum_not_reached_keeps_cause() {
        let err = AggregationError::QuorumNotReached {
            attempts: 100,
            last: AttemptFailure::InsufficientWeight {
                signed: 30,
                total: 100,
                quorum_numerator: 67,
            },
        };
        assert_eq!(err.to_string(), "Quorum not reached after 100 attempts");
        assert!(err
            .source()
            .unwrap()
            .to_string()
            .contains("signed 30 of 100"));
    }
}
