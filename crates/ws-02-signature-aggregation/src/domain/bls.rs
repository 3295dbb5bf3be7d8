//! # BLS Primitives (BLS12-381)
//!
//! Pure domain logic for share verification and aggregation.
//!
//! Public keys are on G1 (48 bytes compressed) and signatures on G2
//! (96 bytes compressed), using blst's `min_pk` variant with the
//! proof-of-possession ciphersuite.

use super::entities::{BlsPublicKey, BlsSignature, BLS_SIGNATURE_LEN};
use super::errors::AttemptFailure;
use blst::min_pk::{AggregatePublicKey, AggregateSignature, PublicKey, Signature};
use blst::BLST_ERROR;

/// Domain Separation Tag for signatures (proof-of-possession scheme).
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Uncompressed public key length, the canonical ordering key.
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 96;

/// Decompress and validate a public key (rejects infinity and off-subgroup points).
pub fn parse_public_key(public_key: &BlsPublicKey) -> Result<PublicKey, BLST_ERROR> {
    PublicKey::key_validate(&public_key.bytes)
}

/// Uncompressed encoding of a parsed key.
pub fn uncompressed_bytes(public_key: &PublicKey) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LEN] {
    public_key.serialize()
}

/// Decompress a signature and check it is in the G2 subgroup.
pub fn parse_signature(signature: &BlsSignature) -> Option<Signature> {
    let sig = Signature::from_bytes(&signature.bytes).ok()?;
    sig.validate(false).ok()?;
    Some(sig)
}

/// Verify a single signature against an already validated key.
pub fn verify(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    signature.verify(false, message, DST, &[], public_key, false) == BLST_ERROR::BLST_SUCCESS
}

/// Aggregate signatures into one.
pub fn aggregate_signatures(signatures: &[Signature]) -> Result<BlsSignature, AttemptFailure> {
    if signatures.is_empty() {
        return Err(AttemptFailure::Aggregation(
            "cannot aggregate empty signature list".to_string(),
        ));
    }
    let refs: Vec<&Signature> = signatures.iter().collect();
    let aggregate = AggregateSignature::aggregate(&refs, false)
        .map_err(|e| AttemptFailure::Aggregation(format!("{:?}", e)))?;

    let bytes: [u8; BLS_SIGNATURE_LEN] = aggregate.to_signature().to_bytes();
    Ok(BlsSignature { bytes })
}

/// Aggregate already validated public keys into one.
pub fn aggregate_public_keys(public_keys: &[&PublicKey]) -> Result<PublicKey, AttemptFailure> {
    if public_keys.is_empty() {
        return Err(AttemptFailure::Aggregation(
            "cannot aggregate empty public key list".to_string(),
        ));
    }
    let aggregate = AggregatePublicKey::aggregate(public_keys, false)
        .map_err(|e| AttemptFailure::Aggregation(format!("{:?}", e)))?;
    Ok(aggregate.to_public_key())
}

#[cfg(test)]
pub(crate) mod test_keys {
    use super::*;
    use crate::domain::entities::{SignatureShare, Validator};
    use blst::min_pk::SecretKey;
    use shared_types::NodeId;

    /// Deterministic key derived from `seed`.
    pub fn secret_key(seed: u8) -> SecretKey {
        SecretKey::key_gen(&[seed; 32], &[]).unwrap()
    }

    pub fn public_key(seed: u8) -> BlsPublicKey {
        BlsPublicKey {
            bytes: secret_key(seed).sk_to_pk().to_bytes(),
        }
    }

    pub fn sign(seed: u8, message: &[u8]) -> BlsSignature {
        BlsSignature {
            bytes: secret_key(seed).sign(message, DST, &[]).to_bytes(),
        }
    }

    pub fn node_id(seed: u8) -> NodeId {
        NodeId([seed; 20])
    }

    pub fn validator(seed: u8, weight: u64) -> Validator {
        Validator {
            node_id: node_id(seed),
            weight,
            public_key: Some(public_key(seed)),
        }
    }

    pub fn share(seed: u8, message: &[u8]) -> SignatureShare {
        SignatureShare {
            node_id: node_id(seed),
            signature: sign(seed, message),
        }
    }
}
