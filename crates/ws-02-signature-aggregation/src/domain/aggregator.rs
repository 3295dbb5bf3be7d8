//! # Share Aggregation
//!
//! Pure logic behind one aggregation attempt:
//!
//! 1. Verify every share against its canonical validator's key (in parallel)
//! 2. Drop unknown signers, invalid shares and duplicates
//! 3. Check the verified weight against the quorum
//! 4. Aggregate and re-verify the result

use super::bitset::SignerBitSet;
use super::bls;
use super::entities::{BlsSignature, SignatureShare};
use super::errors::AttemptFailure;
use super::quorum::QuorumThreshold;
use super::signed_message::BitSetSignature;
use super::validator_set::CanonicalValidatorSet;
use blst::min_pk::{PublicKey, Signature};
use rayon::prelude::*;
use tracing::debug;

/// Combine verified shares into a quorum-satisfying bit-set signature.
pub fn aggregate_shares(
    message: &[u8],
    validators: &CanonicalValidatorSet,
    shares: &[SignatureShare],
    quorum: QuorumThreshold,
) -> Result<BitSetSignature, AttemptFailure> {
    let total_weight = validators.total_weight();
    if total_weight == 0 {
        return Err(AttemptFailure::ZeroTotalWeight);
    }

    // Order of `shares` is preserved, so the first valid share per signer wins.
    let verified: Vec<(usize, Signature)> = shares
        .par_iter()
        .filter_map(|share| verify_share(message, validators, share))
        .collect();

    let mut signers = SignerBitSet::new();
    let mut signatures = Vec::with_capacity(verified.len());
    let mut signed_weight: u64 = 0;
    for (index, signature) in verified {
        if signers.contains(index) {
            debug!("[ws-02] Dropping duplicate share for signer {}", index);
            continue;
        }
        signers.add(index);
        signatures.push(signature);
        // Sum of distinct canonical weights never exceeds total_weight.
        signed_weight += validators.validators()[index].weight;
    }

    if !quorum.is_met(signed_weight, total_weight) {
        return Err(AttemptFailure::InsufficientWeight {
            signed: signed_weight,
            total: total_weight,
            quorum_numerator: quorum.numerator(),
        });
    }

    let signature = bls::aggregate_signatures(&signatures)?;
    verify_aggregate(message, validators, &signers, &signature, quorum)?;

    debug!(
        "[ws-02] Aggregated {} shares, weight {}/{}",
        signers.count(),
        signed_weight,
        total_weight
    );
    Ok(BitSetSignature { signers, signature })
}

fn verify_share(
    message: &[u8],
    validators: &CanonicalValidatorSet,
    share: &SignatureShare,
) -> Option<(usize, Signature)> {
    let Some(index) = validators.index_of(&share.node_id) else {
        debug!("[ws-02] Dropping share from unknown node {}", share.node_id);
        return None;
    };
    let Some(signature) = bls::parse_signature(&share.signature) else {
        debug!("[ws-02] Dropping malformed share from {}", share.node_id);
        return None;
    };
    let key = validators.validators()[index].parsed_key();
    if !bls::verify(message, &signature, key) {
        debug!("[ws-02] Dropping invalid share from {}", share.node_id);
        return None;
    }
    Some((index, signature))
}

/// Check a bit-set signature against the canonical set and quorum.
pub fn verify_aggregate(
    message: &[u8],
    validators: &CanonicalValidatorSet,
    signers: &SignerBitSet,
    signature: &BlsSignature,
    quorum: QuorumThreshold,
) -> Result<(), AttemptFailure> {
    if signers.bit_len() > validators.len() {
        return Err(AttemptFailure::InvalidAggregate);
    }

    let mut keys: Vec<&PublicKey> = Vec::with_capacity(signers.count());
    let mut signed_weight: u64 = 0;
    for index in signers.indices() {
        let validator = &validators.validators()[index];
        keys.push(validator.parsed_key());
        signed_weight += validator.weight;
    }

    if !quorum.is_met(signed_weight, validators.total_weight()) {
        return Err(AttemptFailure::InsufficientWeight {
            signed: signed_weight,
            total: validators.total_weight(),
            quorum_numerator: quorum.numerator(),
        });
    }

    let aggregate_key = bls::aggregate_public_keys(&keys)?;
    let signature = bls::parse_signature(signature).ok_or(AttemptFailure::InvalidAggregate)?;
    if !bls::verify(message, &signature, &aggregate_key) {
        return Err(AttemptFailure::InvalidAggregate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bls::test_keys::*;
    use crate::domain::entities::Validator;

    const MESSAGE: &[u8] = b"conversion attestation";

    fn abc() -> CanonicalValidatorSet {
        CanonicalValidatorSet::new(&[validator(1, 10), validator(2, 20), validator(3, 70)])
            .unwrap()
    }

    fn quorum() -> QuorumThreshold {
        QuorumThreshold::new(67).unwrap()
    }

    #[test]
    fn test_quorum_reached_with_a_and_c() {
        let set = abc();
        let shares = [share(1, MESSAGE), share(3, MESSAGE)];
        let sig = aggregate_shares(MESSAGE, &set, &shares, quorum()).unwrap();

        assert_eq!(sig.signers.count(), 2);
        assert!(sig.signers.contains(set.index_of(&node_id(1)).unwrap()));
        assert!(sig.signers.contains(set.index_of(&node_id(3)).unwrap()));
        assert!(!sig.signers.contains(set.index_of(&node_id(2)).unwrap()));
    }

    #[test]
    fn test_a_and_b_insufficient() {
        let shares = [share(1, MESSAGE), share(2, MESSAGE)];
        assert_eq!(
            aggregate_shares(MESSAGE, &abc(), &shares, quorum()).unwrap_err(),
            AttemptFailure::InsufficientWeight {
                signed: 30,
                total: 100,
                quorum_numerator: 67,
            }
        );
    }

    #[test]
    fn test_exact_boundary() {
        let set =
            CanonicalValidatorSet::new(&[validator(1, 67), validator(2, 33)]).unwrap();
        assert!(aggregate_shares(MESSAGE, &set, &[share(1, MESSAGE)], quorum()).is_ok());

        let set =
            CanonicalValidatorSet::new(&[validator(1, 66), validator(2, 34)]).unwrap();
        assert!(matches!(
            aggregate_shares(MESSAGE, &set, &[share(1, MESSAGE)], quorum()),
            Err(AttemptFailure::InsufficientWeight { signed: 66, .. })
        ));
    }

    #[test]
    fn test_invalid_share_ignored() {
        let shares = [share(1, MESSAGE), share(3, b"some other message")];
        assert!(matches!(
            aggregate_shares(MESSAGE, &abc(), &shares, quorum()),
            Err(AttemptFailure::InsufficientWeight { signed: 10, .. })
        ));
    }

    #[test]
    fn test_unknown_signer_ignored() {
        let shares = [share(3, MESSAGE), share(9, MESSAGE)];
        let sig = aggregate_shares(MESSAGE, &abc(), &shares, quorum()).unwrap();
        assert_eq!(sig.signers.count(), 1);
    }

    #[test]
    fn test_duplicate_shares_counted_once() {
        let set =
            CanonicalValidatorSet::new(&[validator(1, 40), validator(2, 60)]).unwrap();
        let shares = [share(1, MESSAGE), share(1, MESSAGE), share(1, MESSAGE)];
        assert!(matches!(
            aggregate_shares(MESSAGE, &set, &shares, quorum()),
            Err(AttemptFailure::InsufficientWeight { signed: 40, .. })
        ));
    }

    #[test]
    fn test_keyless_weight_raises_threshold() {
        let set = CanonicalValidatorSet::new(&[
            validator(1, 70),
            Validator {
                node_id: node_id(8),
                weight: 30,
                public_key: None,
            },
        ])
        .unwrap();
        assert!(aggregate_shares(MESSAGE, &set, &[share(1, MESSAGE)], quorum()).is_ok());
        let strict = QuorumThreshold::new(80).unwrap();
        assert!(aggregate_shares(MESSAGE, &set, &[share(1, MESSAGE)], strict).is_err());
    }

    #[test]
    fn test_zero_weight_fails() {
        let set = CanonicalValidatorSet::new(&[validator(1, 0)]).unwrap();
        assert_eq!(
            aggregate_shares(MESSAGE, &set, &[share(1, MESSAGE)], quorum()).unwrap_err(),
            AttemptFailure::ZeroTotalWeight
        );
    }

    #[test]
    fn test_no_shares_fails() {
        assert!(matches!(
            aggregate_shares(MESSAGE, &abc(), &[], quorum()),
            Err(AttemptFailure::InsufficientWeight { signed: 0, .. })
        ));
    }

    #[test]
    fn test_verify_aggregate_rejects_wrong_message() {
        let set = abc();
        let sig = aggregate_shares(MESSAGE, &set, &[share(3, MESSAGE)], quorum()).unwrap();
        assert_eq!(
            verify_aggregate(b"tampered", &set, &sig.signers, &sig.signature, quorum()),
            Err(AttemptFailure::InvalidAggregate)
        );
    }

    #[test]
    fn test_verify_aggregate_rejects_out_of_range_signer() {
        let set = abc();
        let mut signers = SignerBitSet::new();
        signers.add(5);
        assert_eq!(
            verify_aggregate(MESSAGE, &set, &signers, &sign(1, MESSAGE), quorum()),
            Err(AttemptFailure::InvalidAggregate)
        );
    }
}
