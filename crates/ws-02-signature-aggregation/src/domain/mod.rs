//! # Domain Module
//!
//! Canonical validator sets, quorum arithmetic, BLS primitives and the
//! signed message format.

pub mod aggregator;
pub mod bitset;
pub mod bls;
pub mod entities;
pub mod errors;
pub mod quorum;
pub mod signed_message;
pub mod validator_set;

pub use aggregator::{aggregate_shares, verify_aggregate};
pub use bitset::SignerBitSet;
pub use entities::*;
pub use errors::*;
pub use quorum::{QuorumThreshold, DEFAULT_QUORUM_NUMERATOR, QUORUM_DENOMINATOR};
pub use signed_message::{BitSetSignature, SignedMessage};
pub use validator_set::{CanonicalValidator, CanonicalValidatorSet};
