//! # Conversion Record
//!
//! The subnet-to-L1 conversion event and its content address.
//!
//! The identifier is SHA-256 over the record's versioned linear encoding.
//! Validator order is part of the hash input and is kept exactly as it
//! appears in the source transaction.

use super::codec::{self, Packable, Packer, Unpacker};
use super::errors::CodecError;
use super::transaction::{ConvertSubnetToL1Tx, BLS_PUBLIC_KEY_LEN};
use shared_types::{sha256, Id};

/// Validator descriptor inside a conversion record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionValidator {
    pub node_id: Vec<u8>,
    pub bls_public_key: [u8; BLS_PUBLIC_KEY_LEN],
    pub weight: u64,
}

impl Packable for ConversionValidator {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_bytes(&self.node_id)?;
        packer.pack_fixed(&self.bls_public_key);
        packer.pack_u64(self.weight);
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            node_id: unpacker.unpack_bytes()?,
            bls_public_key: unpacker.unpack_fixed()?,
            weight: unpacker.unpack_u64()?,
        })
    }
}

/// Conversion of a subnet into an L1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionRecord {
    pub subnet_id: Id,
    pub manager_chain_id: Id,
    /// Empty when no manager address was given.
    pub manager_address: Vec<u8>,
    pub validators: Vec<ConversionValidator>,
}

impl ConversionRecord {
    /// Extract the record from a conversion transaction, preserving order.
    pub fn from_tx(tx: &ConvertSubnetToL1Tx) -> Self {
        Self {
            subnet_id: tx.subnet_id,
            manager_chain_id: tx.chain_id,
            manager_address: tx.address.clone(),
            validators: tx
                .validators
                .iter()
                .map(|v| ConversionValidator {
                    node_id: v.node_id.clone(),
                    bls_public_key: v.public_key,
                    weight: v.weight,
                })
                .collect(),
        }
    }

    /// Canonical versioned encoding.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    /// Content address of the record.
    pub fn conversion_id(&self) -> Result<Id, CodecError> {
        Ok(Id(sha256(&self.encode()?)))
    }

    /// Sum of declared validator weights.
    pub fn total_weight(&self) -> Option<u64> {
        self.validators
            .iter()
            .try_fold(0u64, |acc, v| acc.checked_add(v.weight))
    }
}

impl Packable for ConversionRecord {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.subnet_id.pack(packer)?;
        self.manager_chain_id.pack(packer)?;
        packer.pack_bytes(&self.manager_address)?;
        packer.pack_vec(&self.validators)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            subnet_id: Id::unpack(unpacker)?,
            manager_chain_id: Id::unpack(unpacker)?,
            manager_address: unpacker.unpack_bytes()?,
            validators: unpacker.unpack_vec()?,
        })
    }
}
