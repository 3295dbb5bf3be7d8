//! # Domain Entities
//!
//! Core data structures for signature aggregation.

use shared_types::NodeId;

/// Compressed G1 public key length.
pub const BLS_PUBLIC_KEY_LEN: usize = 48;

/// Compressed G2 signature length.
pub const BLS_SIGNATURE_LEN: usize = 96;

// =============================================================================
// BLS Types (BLS12-381, public keys on G1)
// =============================================================================

/// BLS public key (G1 point, compressed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlsPublicKey {
    /// G1 point (48 bytes compressed)
    pub bytes: [u8; BLS_PUBLIC_KEY_LEN],
}

/// BLS signature (G2 point, compressed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlsSignature {
    /// G2 point (96 bytes compressed)
    pub bytes: [u8; BLS_SIGNATURE_LEN],
}

impl TryFrom<&[u8]> for BlsPublicKey {
    type Error = usize;

    /// Fails with the actual length when it is not 48.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self {
            bytes: bytes.try_into().map_err(|_| bytes.len())?,
        })
    }
}

impl TryFrom<&[u8]> for BlsSignature {
    type Error = usize;

    /// Fails with the actual length when it is not 96.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self {
            bytes: bytes.try_into().map_err(|_| bytes.len())?,
        })
    }
}

// =============================================================================
// Validator and Share Types
// =============================================================================

/// A validator as reported by the ledger for one subnet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    pub node_id: NodeId,
    pub weight: u64,
    /// Validators without a key count toward total weight but cannot sign.
    pub public_key: Option<BlsPublicKey>,
}

/// One validator's signature over the unsigned message bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureShare {
    pub node_id: NodeId,
    pub signature: BlsSignature,
}
