//! # Attestation Messages
//!
//! The envelope validators sign over, and the payloads nested inside it.
//!
//! ```text
//! UnsignedMessage { network_id, source_chain_id, payload }
//!   └─ AddressedCall { source_address, payload }
//!        └─ ConversionPayload { conversion_id }
//! ```

use super::codec::{self, Packable, Packer, Unpacker};
use super::errors::CodecError;
use shared_types::{sha256, Id};

/// Mainnet network identifier.
pub const MAINNET_ID: u32 = 1;

/// Fuji testnet network identifier.
pub const FUJI_ID: u32 = 5;

/// Local development network identifier.
pub const LOCAL_ID: u32 = 12345;

/// Identifier of the coordinating chain that records conversions.
pub const PLATFORM_CHAIN_ID: Id = Id::EMPTY;

/// Type id of [`ConversionPayload`] in the attestation payload registry.
const CONVERSION_PAYLOAD_TYPE_ID: u32 = 0;

/// Type id of [`AddressedCall`] in the generic payload registry (0 is a bare hash).
const ADDRESSED_CALL_TYPE_ID: u32 = 1;

fn expect_type_id(
    unpacker: &mut Unpacker<'_>,
    expected: u32,
    context: &'static str,
) -> Result<(), CodecError> {
    match unpacker.unpack_u32()? {
        id if id == expected => Ok(()),
        type_id => Err(CodecError::UnknownTypeId { context, type_id }),
    }
}

/// Announces that a conversion with this identifier took place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionPayload {
    pub conversion_id: Id,
}

impl ConversionPayload {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

impl Packable for ConversionPayload {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(CONVERSION_PAYLOAD_TYPE_ID);
        self.conversion_id.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        expect_type_id(unpacker, CONVERSION_PAYLOAD_TYPE_ID, "attestation payload")?;
        Ok(Self {
            conversion_id: Id::unpack(unpacker)?,
        })
    }
}

/// Payload optionally addressed to a sender on the source chain.
///
/// An empty `source_address` means the call comes from the chain's own
/// logic rather than a specific contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressedCall {
    pub source_address: Vec<u8>,
    pub payload: Vec<u8>,
}

impl AddressedCall {
    /// Wrap a payload with no source address.
    pub fn unaddressed(payload: Vec<u8>) -> Self {
        Self {
            source_address: Vec::new(),
            payload,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

impl Packable for AddressedCall {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(ADDRESSED_CALL_TYPE_ID);
        packer.pack_bytes(&self.source_address)?;
        packer.pack_bytes(&self.payload)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        expect_type_id(unpacker, ADDRESSED_CALL_TYPE_ID, "addressed call")?;
        Ok(Self {
            source_address: unpacker.unpack_bytes()?,
            payload: unpacker.unpack_bytes()?,
        })
    }
}

/// The byte envelope validators sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedMessage {
    pub network_id: u32,
    pub source_chain_id: Id,
    pub payload: Vec<u8>,
}

impl UnsignedMessage {
    pub fn new(network_id: u32, source_chain_id: Id, payload: Vec<u8>) -> Self {
        Self {
            network_id,
            source_chain_id,
            payload,
        }
    }

    /// Canonical bytes that signers sign over.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }

    /// SHA-256 of the canonical bytes.
    pub fn id(&self) -> Result<Id, CodecError> {
        Ok(Id(sha256(&self.encode()?)))
    }
}

impl Packable for UnsignedMessage {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.network_id);
        self.source_chain_id.pack(packer)?;
        packer.pack_bytes(&self.payload)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: unpacker.unpack_u32()?,
            source_chain_id: Id::unpack(unpacker)?,
            payload: unpacker.unpack_bytes()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_payload_bytes() {
        let payload = ConversionPayload {
            conversion_id: Id([0xAB; 32]),
        };
        let bytes = payload.encode().unwrap();
        assert_eq!(bytes.len(), 2 + 4 + 32);
        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[6..], &[0xAB; 32]);
    }

    #[test]
    fn test_addressed_call_bytes() {
        let call = AddressedCall::unaddressed(vec![9, 9]);
        let bytes = call.encode().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2, 9, 9]);
    }

    #[test]
    fn test_addressed_call_with_address() {
        let call = AddressedCall {
            source_address: vec![7; 20],
            payload: vec![1],
        };
        let back = AddressedCall::decode(&call.encode().unwrap()).unwrap();
        assert_eq!(back, call);
    }

    #[test]
    fn test_addressed_call_rejects_hash_type() {
        // A bare hash payload: type id 0 followed by 32 bytes.
        let mut hash = vec![0u8; 6];
        hash.extend_from_slice(&[0u8; 32]);
        assert!(matches!(
            AddressedCall::decode(&hash),
            Err(CodecError::UnknownTypeId { type_id: 0, .. })
        ));
    }

    #[test]
    fn test_unsigned_message_bytes() {
        let msg = UnsignedMessage::new(FUJI_ID, PLATFORM_CHAIN_ID, vec![1, 2, 3]);
        let bytes = msg.encode().unwrap();
        let mut expected = vec![0, 0, 0, 0, 0, 5];
        expected.extend_from_slice(&[0u8; 32]);
        expected.extend_from_slice(&[0, 0, 0, 3, 1, 2, 3]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_unsigned_message_decode() {
        let msg = UnsignedMessage::new(MAINNET_ID, Id([4; 32]), vec![5; 10]);
        let back = UnsignedMessage::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_message_id_depends_on_network() {
        let a = UnsignedMessage::new(FUJI_ID, PLATFORM_CHAIN_ID, vec![1]);
        let b = UnsignedMessage::new(MAINNET_ID, PLATFORM_CHAIN_ID, vec![1]);
        assert_ne!(a.id().unwrap(), b.id().unwrap());
    }
}
