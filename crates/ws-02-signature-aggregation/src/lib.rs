//! # WS-02 Signature Aggregation
//!
//! Collects BLS signature shares over an attestation message from the
//! validators of a subnet and combines them into a single signature once
//! enough stake has signed.
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Attempt
//!
//! 1. Read the destination subnet's validator set
//! 2. Canonicalise it: drop keyless validators, merge shared keys, sort by key
//! 3. Request a share from every signing validator, bounded by a timeout
//! 4. Verify shares in parallel, check quorum, aggregate and re-verify
//!
//! Attempts repeat until one succeeds or the retry policy is exhausted.
//!
//! ## Module Structure
//!
//! ```text
//! ws-02-signature-aggregation/
//! ├── domain/          # Validator sets, quorum, bit sets, BLS, signed message
//! ├── ports/           # SignatureAggregationApi, PeerNetwork, CryptoAggregator
//! ├── adapters/        # HTTP peer network, blst aggregator
//! └── service.rs       # AggregationClient retry loop
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{BlsCryptoAggregator, HttpPeerNetwork, PeerNetworkConfig};
pub use domain::{
    aggregate_shares, verify_aggregate, AggregationError, AttemptFailure, BitSetSignature,
    BlsPublicKey, BlsSignature, CanonicalValidator, CanonicalValidatorSet, QuorumThreshold,
    SignatureShare, SignedMessage, SignerBitSet, Validator, DEFAULT_QUORUM_NUMERATOR,
    QUORUM_DENOMINATOR,
};
pub use ports::{
    CryptoAggregator, MockPeerNetwork, PeerNetwork, ShareRequest, SignatureAggregationApi,
};
pub use service::{AggregationClient, RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_ATTEMPTS};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
