//! # Message Derivation
//!
//! Pure transformation from signed conversion-transaction bytes to the
//! canonical unsigned attestation message.
//!
//! ```text
//! tx bytes ──parse──► ConvertSubnetToL1Tx ──► ConversionRecord
//!                                               │ sha256
//!                                               ▼
//!   UnsignedMessage(network, P-chain, AddressedCall(ConversionPayload(id)))
//! ```

use super::conversion::ConversionRecord;
use super::errors::DerivationError;
use super::transaction::{Tx, UnsignedTx};
use super::warp::{AddressedCall, ConversionPayload, UnsignedMessage, PLATFORM_CHAIN_ID};
use shared_types::Id;

/// Result of a successful derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedMessage {
    /// ID of the source transaction.
    pub tx_id: Id,
    /// Subnet being converted. Signers are drawn from this subnet.
    pub subnet_id: Id,
    pub record: ConversionRecord,
    pub conversion_id: Id,
    pub message: UnsignedMessage,
    /// Canonical encoding of `message`.
    pub bytes: Vec<u8>,
}

impl DerivedMessage {
    /// Justification attached to signature requests: the subnet ID bytes.
    pub fn justification(&self) -> Vec<u8> {
        self.subnet_id.as_bytes().to_vec()
    }
}

/// Derive the attestation message from raw signed transaction bytes.
///
/// Fails with [`DerivationError::Decode`] on malformed bytes and
/// [`DerivationError::UnexpectedTransactionType`] for any kind other than a
/// subnet-to-L1 conversion.
pub fn derive_message(tx_bytes: &[u8], network_id: u32) -> Result<DerivedMessage, DerivationError> {
    let tx = Tx::parse(tx_bytes).map_err(DerivationError::Decode)?;
    derive_from_tx(&tx, network_id)
}

/// Derive the attestation message from an initialised transaction.
pub fn derive_from_tx(tx: &Tx, network_id: u32) -> Result<DerivedMessage, DerivationError> {
    let convert = match &tx.unsigned {
        UnsignedTx::ConvertSubnetToL1(convert) => convert,
        other => return Err(DerivationError::UnexpectedTransactionType(other.kind())),
    };

    let record = ConversionRecord::from_tx(convert);
    let conversion_id = record
        .conversion_id()
        .map_err(DerivationError::Derivation)?;

    let payload = ConversionPayload { conversion_id }
        .encode()
        .map_err(DerivationError::Derivation)?;
    let call = AddressedCall::unaddressed(payload)
        .encode()
        .map_err(DerivationError::Derivation)?;

    let message = UnsignedMessage::new(network_id, PLATFORM_CHAIN_ID, call);
    let bytes = message.encode().map_err(DerivationError::Derivation)?;

    Ok(DerivedMessage {
        tx_id: tx.id(),
        subnet_id: convert.subnet_id,
        record,
        conversion_id,
        message,
        bytes,
    })
}
