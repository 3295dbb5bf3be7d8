//! # Signed Attestation Message
//!
//! ```text
//! version || networkID || sourceChainID || payload
//!         || u32 0 || signers bit set || aggregate signature[96]
//! ```

use super::aggregator::verify_aggregate;
use super::bitset::SignerBitSet;
use super::entities::{BlsSignature, BLS_SIGNATURE_LEN};
use super::errors::AttemptFailure;
use super::quorum::QuorumThreshold;
use super::validator_set::CanonicalValidatorSet;
use ws_01_message_derivation::domain::codec::{self, Packable, Packer, Unpacker};
use ws_01_message_derivation::{CodecError, UnsignedMessage};

/// Type id of [`BitSetSignature`] in the signature registry.
const BITSET_SIGNATURE_TYPE_ID: u32 = 0;

/// Aggregate signature plus the canonical indices of its signers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitSetSignature {
    pub signers: SignerBitSet,
    pub signature: BlsSignature,
}

impl Packable for BitSetSignature {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(BITSET_SIGNATURE_TYPE_ID);
        packer.pack_bytes(&self.signers.to_bytes())?;
        packer.pack_fixed(&self.signature.bytes);
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match unpacker.unpack_u32()? {
            BITSET_SIGNATURE_TYPE_ID => {}
            type_id => {
                return Err(CodecError::UnknownTypeId {
                    context: "warp signature",
                    type_id,
                })
            }
        }
        let signers = SignerBitSet::from_bytes(&unpacker.unpack_bytes()?)?;
        let bytes: [u8; BLS_SIGNATURE_LEN] = unpacker.unpack_fixed()?;
        Ok(Self {
            signers,
            signature: BlsSignature { bytes },
        })
    }
}

/// An unsigned message together with its quorum signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub unsigned: UnsignedMessage,
    pub signature: BitSetSignature,
}

impl SignedMessage {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }

    /// Verify the signature against `validators` at the given quorum.
    pub fn verify(
        &self,
        validators: &CanonicalValidatorSet,
        quorum: QuorumThreshold,
    ) -> Result<(), AttemptFailure> {
        let message = self
            .unsigned
            .encode()
            .map_err(|e| AttemptFailure::Aggregation(e.to_string()))?;
        verify_aggregate(
            &message,
            validators,
            &self.signature.signers,
            &self.signature.signature,
            quorum,
        )
    }
}

impl Packable for SignedMessage {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.unsigned.pack(packer)?;
        self.signature.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            unsigned: UnsignedMessage::unpack(unpacker)?,
            signature: BitSetSignature::unpack(unpacker)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregator::aggregate_shares;
    use crate::domain::bls::test_keys::*;
    use ws_01_message_derivation::{FUJI_ID, PLATFORM_CHAIN_ID};

    fn unsigned() -> UnsignedMessage {
        UnsignedMessage::new(FUJI_ID, PLATFORM_CHAIN_ID, vec![1, 2, 3])
    }

    #[test]
    fn test_layout_extends_unsigned_bytes() {
        let unsigned = unsigned();
        let mut signers = SignerBitSet::new();
        signers.add(0);
        signers.add(2);
        let signed = SignedMessage {
            unsigned: unsigned.clone(),
            signature: BitSetSignature {
                signers,
                signature: BlsSignature { bytes: [7; 96] },
            },
        };
        let bytes = signed.encode().unwrap();
        let prefix = unsigned.encode().unwrap();
        assert!(bytes.starts_with(&prefix));

        let tail = &bytes[prefix.len()..];
        assert_eq!(&tail[..4], &[0, 0, 0, 0]);
        assert_eq!(&tail[4..9], &[0, 0, 0, 1, 0b101]);
        assert_eq!(&tail[9..], &[7; 96]);
    }

    #[test]
    fn test_decode_restores_message() {
        let unsigned = unsigned();
        let message = unsigned.encode().unwrap();
        let set =
            CanonicalValidatorSet::new(&[validator(1, 50), validator(2, 50)]).unwrap();
        let signature = aggregate_shares(
            &message,
            &set,
            &[share(1, &message), share(2, &message)],
            QuorumThreshold::default(),
        )
        .unwrap();
        let signed = SignedMessage {
            unsigned,
            signature,
        };

        let decoded = SignedMessage::decode(&signed.encode().unwrap()).unwrap();
        assert_eq!(decoded, signed);
        assert!(decoded.verify(&set, QuorumThreshold::default()).is_ok());
    }

    #[test]
    fn test_unknown_signature_type_rejected() {
        let mut bytes = unsigned().encode().unwrap();
        bytes.extend_from_slice(&1u32.to_be_bytes());
        assert!(matches!(
            SignedMessage::decode(&bytes),
            Err(CodecError::UnknownTypeId { type_id: 1, .. })
        ));
    }

    #[test]
    fn test_non_canonical_signers_rejected() {
        let mut bytes = unsigned().encode().unwrap();
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 2, 0, 1]);
        bytes.extend_from_slice(&[0; 96]);
        assert!(matches!(
            SignedMessage::decode(&bytes),
            Err(CodecError::NonCanonical)
        ));
    }
}
