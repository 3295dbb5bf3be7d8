//! Validator keys and conversion transactions backed by real BLS keys.

use blst::min_pk::SecretKey;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use shared_types::{Id, NodeId, ShortId};
use ws_01_message_derivation::domain::{
    Authorization, BaseTx, ConvertSubnetToL1Tx, L1Validator, PChainOwner, BLS_POP_LEN,
};
use ws_01_message_derivation::{Tx, UnsignedTx, FUJI_ID};
use ws_02_signature_aggregation::domain::bls::DST;
use ws_02_signature_aggregation::{BlsPublicKey, BlsSignature, SignatureShare, Validator};

/// Subnet converted by [`conversion_tx`].
pub const SUBNET_ID: Id = Id([0x51; 32]);

/// One validator with its secret key.
pub struct SignerKey {
    secret: SecretKey,
    pub validator: Validator,
}

impl SignerKey {
    pub fn node_id(&self) -> NodeId {
        self.validator.node_id
    }

    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature {
            bytes: self.secret.sign(message, DST, &[]).to_bytes(),
        }
    }

    pub fn share(&self, message: &[u8]) -> SignatureShare {
        SignatureShare {
            node_id: self.node_id(),
            signature: self.sign(message),
        }
    }

    /// Same key reported under another node ID.
    pub fn alias(&self, node_id: NodeId, weight: u64) -> Validator {
        Validator {
            node_id,
            weight,
            public_key: self.validator.public_key,
        }
    }
}

/// Deterministic RNG for reproducible fixtures.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// One freshly keyed validator per weight.
pub fn generate_keys(rng: &mut impl RngCore, weights: &[u64]) -> Vec<SignerKey> {
    weights
        .iter()
        .map(|weight| {
            let mut ikm = [0u8; 32];
            rng.fill_bytes(&mut ikm);
            let secret = SecretKey::key_gen(&ikm, &[]).expect("32-byte ikm");

            let mut node_id = [0u8; 20];
            rng.fill_bytes(&mut node_id);

            let validator = Validator {
                node_id: NodeId(node_id),
                weight: *weight,
                public_key: Some(BlsPublicKey {
                    bytes: secret.sk_to_pk().to_bytes(),
                }),
            };
            SignerKey { secret, validator }
        })
        .collect()
}

pub fn validators(keys: &[SignerKey]) -> Vec<Validator> {
    keys.iter().map(|k| k.validator.clone()).collect()
}

/// Signed conversion of [`SUBNET_ID`] to an L1 validated by `keys`.
pub fn conversion_tx(keys: &[SignerKey]) -> Tx {
    let validators = keys
        .iter()
        .map(|key| L1Validator {
            node_id: key.node_id().as_bytes().to_vec(),
            weight: key.validator.weight,
            balance: 1_000_000_000,
            public_key: key
                .validator
                .public_key
                .map(|pk| pk.bytes)
                .unwrap_or([0; 48]),
            proof_of_possession: [0; BLS_POP_LEN],
            remaining_balance_owner: PChainOwner {
                threshold: 1,
                addresses: vec![ShortId([0x31; 20])],
            },
            deactivation_owner: PChainOwner::default(),
        })
        .collect();

    let unsigned = UnsignedTx::ConvertSubnetToL1(ConvertSubnetToL1Tx {
        base: BaseTx {
            network_id: FUJI_ID,
            blockchain_id: Id::EMPTY,
            outputs: Vec::new(),
            inputs: Vec::new(),
            memo: b"convert".to_vec(),
        },
        subnet_id: SUBNET_ID,
        chain_id: Id([0x61; 32]),
        address: vec![0x71; 20],
        validators,
        subnet_auth: Authorization {
            sig_indices: vec![0],
        },
    });
    Tx::new(unsigned, Vec::new()).expect("fixture transaction encodes")
}
