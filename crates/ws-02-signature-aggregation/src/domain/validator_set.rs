//! # Canonical Validator Set
//!
//! The ordering signers and verifiers agree on when interpreting a signer
//! bit set:
//!
//! 1. Every validator's weight counts toward the total.
//! 2. Validators without a BLS key are otherwise ignored.
//! 3. Validators sharing a key are merged, weights summed.
//! 4. The result is sorted by uncompressed public-key bytes.

use super::bls::{self, UNCOMPRESSED_PUBLIC_KEY_LEN};
use super::entities::{BlsPublicKey, Validator};
use super::errors::AttemptFailure;
use blst::min_pk::PublicKey;
use shared_types::NodeId;
use std::collections::HashMap;

/// A signing identity in the canonical set.
#[derive(Clone, Debug)]
pub struct CanonicalValidator {
    pub public_key: BlsPublicKey,
    pub weight: u64,
    /// Every node ID that registered this key.
    pub node_ids: Vec<NodeId>,
    parsed: PublicKey,
    sort_key: [u8; UNCOMPRESSED_PUBLIC_KEY_LEN],
}

impl CanonicalValidator {
    pub(crate) fn parsed_key(&self) -> &PublicKey {
        &self.parsed
    }
}

#[derive(Clone, Debug)]
pub struct CanonicalValidatorSet {
    validators: Vec<CanonicalValidator>,
    total_weight: u64,
    index: HashMap<NodeId, usize>,
}

impl CanonicalValidatorSet {
    /// Build the canonical set.
    ///
    /// Fails on weight overflow or an unparseable public key.
    pub fn new(validators: &[Validator]) -> Result<Self, AttemptFailure> {
        let mut total_weight: u64 = 0;
        let mut by_key: HashMap<[u8; UNCOMPRESSED_PUBLIC_KEY_LEN], CanonicalValidator> =
            HashMap::new();

        for validator in validators {
            total_weight = total_weight.checked_add(validator.weight).ok_or_else(|| {
                AttemptFailure::ValidatorSet("total weight overflows u64".to_string())
            })?;

            let Some(public_key) = validator.public_key else {
                continue;
            };
            let parsed = bls::parse_public_key(&public_key).map_err(|e| {
                AttemptFailure::ValidatorSet(format!(
                    "invalid public key for {}: {:?}",
                    validator.node_id, e
                ))
            })?;
            let sort_key = bls::uncompressed_bytes(&parsed);

            let entry = by_key.entry(sort_key).or_insert_with(|| CanonicalValidator {
                public_key,
                weight: 0,
                node_ids: Vec::new(),
                parsed,
                sort_key,
            });
            // Bounded by total_weight, which did not overflow.
            entry.weight += validator.weight;
            entry.node_ids.push(validator.node_id);
        }

        let mut validators: Vec<CanonicalValidator> = by_key.into_values().collect();
        validators.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

        let index = validators
            .iter()
            .enumerate()
            .flat_map(|(i, v)| v.node_ids.iter().map(move |id| (*id, i)))
            .collect();

        Ok(Self {
            validators,
            total_weight,
            index,
        })
    }

    pub fn validators(&self) -> &[CanonicalValidator] {
        &self.validators
    }

    /// Weight of every tracked validator, keyless ones included.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Canonical index of the signer owning `node_id`.
    pub fn index_of(&self, node_id: &NodeId) -> Option<usize> {
        self.index.get(node_id).copied()
    }

    /// Node IDs able to sign, in canonical order.
    pub fn signing_node_ids(&self) -> Vec<NodeId> {
        self.validators
            .iter()
            .flat_map(|v| v.node_ids.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
