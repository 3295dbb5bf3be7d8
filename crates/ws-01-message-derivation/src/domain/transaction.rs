//! # Ledger Transactions
//!
//! Signed coordinating-chain transactions as a tagged sum type over
//! transaction kinds. Only the conversion-bearing kind feeds the attestation
//! path; the others exist so they can be recognised and rejected by kind.
//!
//! ## Layout
//!
//! ```text
//! version(u16) || type_id(u32) || unsigned fields || creds(u32 n, n × credential)
//! ```

use super::codec::{Packable, Packer, Unpacker};
use super::errors::CodecError;
use shared_types::{sha256, Id, ShortId};
use std::fmt;

/// Compressed BLS public key length.
pub const BLS_PUBLIC_KEY_LEN: usize = 48;

/// BLS proof-of-possession length.
pub const BLS_POP_LEN: usize = 96;

/// Recoverable secp256k1 signature length.
pub const SECP256K1_SIG_LEN: usize = 65;

mod type_id {
    pub const TRANSFER_INPUT: u32 = 5;
    pub const TRANSFER_OUTPUT: u32 = 7;
    pub const CREDENTIAL: u32 = 9;
    pub const INPUT: u32 = 10;
    pub const OUTPUT_OWNERS: u32 = 11;
    pub const LOCK_IN: u32 = 21;
    pub const LOCK_OUT: u32 = 22;
}

// =============================================================================
// Transaction kinds
// =============================================================================

/// Every ledger transaction kind the codec recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxKind {
    AddValidator,
    AddSubnetValidator,
    AddDelegator,
    CreateChain,
    CreateSubnet,
    Import,
    Export,
    AdvanceTime,
    RewardValidator,
    RemoveSubnetValidator,
    TransformSubnet,
    AddPermissionlessValidator,
    AddPermissionlessDelegator,
    TransferSubnetOwnership,
    Base,
    ConvertSubnetToL1,
    RegisterL1Validator,
    SetL1ValidatorWeight,
    IncreaseL1ValidatorBalance,
    DisableL1Validator,
}

impl TxKind {
    /// Codec type id of this kind.
    pub fn type_id(self) -> u32 {
        match self {
            TxKind::AddValidator => 12,
            TxKind::AddSubnetValidator => 13,
            TxKind::AddDelegator => 14,
            TxKind::CreateChain => 15,
            TxKind::CreateSubnet => 16,
            TxKind::Import => 17,
            TxKind::Export => 18,
            TxKind::AdvanceTime => 19,
            TxKind::RewardValidator => 20,
            TxKind::RemoveSubnetValidator => 23,
            TxKind::TransformSubnet => 24,
            TxKind::AddPermissionlessValidator => 25,
            TxKind::AddPermissionlessDelegator => 26,
            TxKind::TransferSubnetOwnership => 33,
            TxKind::Base => 34,
            TxKind::ConvertSubnetToL1 => 35,
            TxKind::RegisterL1Validator => 36,
            TxKind::SetL1ValidatorWeight => 37,
            TxKind::IncreaseL1ValidatorBalance => 38,
            TxKind::DisableL1Validator => 39,
        }
    }

    /// Look up a kind by codec type id.
    pub fn from_type_id(id: u32) -> Option<Self> {
        let kind = match id {
            12 => TxKind::AddValidator,
            13 => TxKind::AddSubnetValidator,
            14 => TxKind::AddDelegator,
            15 => TxKind::CreateChain,
            16 => TxKind::CreateSubnet,
            17 => TxKind::Import,
            18 => TxKind::Export,
            19 => TxKind::AdvanceTime,
            20 => TxKind::RewardValidator,
            23 => TxKind::RemoveSubnetValidator,
            24 => TxKind::TransformSubnet,
            25 => TxKind::AddPermissionlessValidator,
            26 => TxKind::AddPermissionlessDelegator,
            33 => TxKind::TransferSubnetOwnership,
            34 => TxKind::Base,
            35 => TxKind::ConvertSubnetToL1,
            36 => TxKind::RegisterL1Validator,
            37 => TxKind::SetL1ValidatorWeight,
            38 => TxKind::IncreaseL1ValidatorBalance,
            39 => TxKind::DisableL1Validator,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}Tx", self)
    }
}

// =============================================================================
// Fx components
// =============================================================================

/// Spending conditions of an output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputOwners {
    pub locktime: u64,
    pub threshold: u32,
    pub addresses: Vec<ShortId>,
}

impl Packable for OutputOwners {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.locktime);
        packer.pack_u32(self.threshold);
        packer.pack_vec(&self.addresses)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            locktime: unpacker.unpack_u64()?,
            threshold: unpacker.unpack_u32()?,
            addresses: unpacker.unpack_vec()?,
        })
    }
}

/// Plain transfer output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl Packable for TransferOutput {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.amount);
        self.owners.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: unpacker.unpack_u64()?,
            owners: OutputOwners::unpack(unpacker)?,
        })
    }
}

fn pack_transfer_output(out: &TransferOutput, packer: &mut Packer) -> Result<(), CodecError> {
    packer.pack_u32(type_id::TRANSFER_OUTPUT);
    out.pack(packer)
}

fn unpack_transfer_output(unpacker: &mut Unpacker<'_>) -> Result<TransferOutput, CodecError> {
    match unpacker.unpack_u32()? {
        type_id::TRANSFER_OUTPUT => TransferOutput::unpack(unpacker),
        other => Err(CodecError::UnknownTypeId {
            context: "transferable output",
            type_id: other,
        }),
    }
}

/// Output interface value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Transfer(TransferOutput),
    Locked { locktime: u64, output: TransferOutput },
}

impl Packable for Output {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        match self {
            Output::Transfer(out) => pack_transfer_output(out, packer),
            Output::Locked { locktime, output } => {
                packer.pack_u32(type_id::LOCK_OUT);
                packer.pack_u64(*locktime);
                pack_transfer_output(output, packer)
            }
        }
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match unpacker.unpack_u32()? {
            type_id::TRANSFER_OUTPUT => Ok(Output::Transfer(TransferOutput::unpack(unpacker)?)),
            type_id::LOCK_OUT => Ok(Output::Locked {
                locktime: unpacker.unpack_u64()?,
                output: unpack_transfer_output(unpacker)?,
            }),
            other => Err(CodecError::UnknownTypeId {
                context: "output",
                type_id: other,
            }),
        }
    }
}

/// Plain transfer input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferInput {
    pub amount: u64,
    pub sig_indices: Vec<u32>,
}

impl Packable for TransferInput {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.amount);
        packer.pack_vec(&self.sig_indices)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: unpacker.unpack_u64()?,
            sig_indices: unpacker.unpack_vec()?,
        })
    }
}

fn pack_transfer_input(input: &TransferInput, packer: &mut Packer) -> Result<(), CodecError> {
    packer.pack_u32(type_id::TRANSFER_INPUT);
    input.pack(packer)
}

fn unpack_transfer_input(unpacker: &mut Unpacker<'_>) -> Result<TransferInput, CodecError> {
    match unpacker.unpack_u32()? {
        type_id::TRANSFER_INPUT => TransferInput::unpack(unpacker),
        other => Err(CodecError::UnknownTypeId {
            context: "transferable input",
            type_id: other,
        }),
    }
}

/// Input interface value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Transfer(TransferInput),
    Locked { locktime: u64, input: TransferInput },
}

impl Packable for Input {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        match self {
            Input::Transfer(input) => pack_transfer_input(input, packer),
            Input::Locked { locktime, input } => {
                packer.pack_u32(type_id::LOCK_IN);
                packer.pack_u64(*locktime);
                pack_transfer_input(input, packer)
            }
        }
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match unpacker.unpack_u32()? {
            type_id::TRANSFER_INPUT => Ok(Input::Transfer(TransferInput::unpack(unpacker)?)),
            type_id::LOCK_IN => Ok(Input::Locked {
                locktime: unpacker.unpack_u64()?,
                input: unpack_transfer_input(unpacker)?,
            }),
            other => Err(CodecError::UnknownTypeId {
                context: "input",
                type_id: other,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub output: Output,
}

impl Packable for TransferableOutput {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.asset_id.pack(packer)?;
        self.output.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            asset_id: Id::unpack(unpacker)?,
            output: Output::unpack(unpacker)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferableInput {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub input: Input,
}

impl Packable for TransferableInput {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.tx_id.pack(packer)?;
        packer.pack_u32(self.output_index);
        self.asset_id.pack(packer)?;
        self.input.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tx_id: Id::unpack(unpacker)?,
            output_index: unpacker.unpack_u32()?,
            asset_id: Id::unpack(unpacker)?,
            input: Input::unpack(unpacker)?,
        })
    }
}

/// Signature-index authorisation (subnet auth, disable auth).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Authorization {
    pub sig_indices: Vec<u32>,
}

impl Packable for Authorization {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(type_id::INPUT);
        packer.pack_vec(&self.sig_indices)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match unpacker.unpack_u32()? {
            type_id::INPUT => Ok(Self {
                sig_indices: unpacker.unpack_vec()?,
            }),
            other => Err(CodecError::UnknownTypeId {
                context: "authorization",
                type_id: other,
            }),
        }
    }
}

/// Secp256k1 credential.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credential {
    pub signatures: Vec<[u8; SECP256K1_SIG_LEN]>,
}

impl Packable for Credential {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(type_id::CREDENTIAL);
        packer.pack_vec(&self.signatures)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match unpacker.unpack_u32()? {
            type_id::CREDENTIAL => Ok(Self {
                signatures: unpacker.unpack_vec()?,
            }),
            other => Err(CodecError::UnknownTypeId {
                context: "credential",
                type_id: other,
            }),
        }
    }
}

/// Owner of an L1 validator's leftover balance or deactivation right.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PChainOwner {
    pub threshold: u32,
    pub addresses: Vec<ShortId>,
}

impl Packable for PChainOwner {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.threshold);
        packer.pack_vec(&self.addresses)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            threshold: unpacker.unpack_u32()?,
            addresses: unpacker.unpack_vec()?,
        })
    }
}

// =============================================================================
// Unsigned transaction bodies
// =============================================================================

/// Fields common to every modeled transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferableOutput>,
    pub inputs: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl Packable for BaseTx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.network_id);
        self.blockchain_id.pack(packer)?;
        packer.pack_vec(&self.outputs)?;
        packer.pack_vec(&self.inputs)?;
        packer.pack_bytes(&self.memo)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: unpacker.unpack_u32()?,
            blockchain_id: Id::unpack(unpacker)?,
            outputs: unpacker.unpack_vec()?,
            inputs: unpacker.unpack_vec()?,
            memo: unpacker.unpack_bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateSubnetTx {
    pub base: BaseTx,
    pub owner: OutputOwners,
}

impl Packable for CreateSubnetTx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(packer)?;
        packer.pack_u32(type_id::OUTPUT_OWNERS);
        self.owner.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let base = BaseTx::unpack(unpacker)?;
        match unpacker.unpack_u32()? {
            type_id::OUTPUT_OWNERS => Ok(Self {
                base,
                owner: OutputOwners::unpack(unpacker)?,
            }),
            other => Err(CodecError::UnknownTypeId {
                context: "subnet owner",
                type_id: other,
            }),
        }
    }
}

/// Initial L1 validator declared by a conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct L1Validator {
    /// Node identifier as a length-prefixed byte string.
    pub node_id: Vec<u8>,
    pub weight: u64,
    pub balance: u64,
    pub public_key: [u8; BLS_PUBLIC_KEY_LEN],
    pub proof_of_possession: [u8; BLS_POP_LEN],
    pub remaining_balance_owner: PChainOwner,
    pub deactivation_owner: PChainOwner,
}

impl Packable for L1Validator {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_bytes(&self.node_id)?;
        packer.pack_u64(self.weight);
        packer.pack_u64(self.balance);
        packer.pack_fixed(&self.public_key);
        packer.pack_fixed(&self.proof_of_possession);
        self.remaining_balance_owner.pack(packer)?;
        self.deactivation_owner.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            node_id: unpacker.unpack_bytes()?,
            weight: unpacker.unpack_u64()?,
            balance: unpacker.unpack_u64()?,
            public_key: unpacker.unpack_fixed()?,
            proof_of_possession: unpacker.unpack_fixed()?,
            remaining_balance_owner: PChainOwner::unpack(unpacker)?,
            deactivation_owner: PChainOwner::unpack(unpacker)?,
        })
    }
}

/// Converts a permissioned subnet into an L1 with an initial validator set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertSubnetToL1Tx {
    pub base: BaseTx,
    pub subnet_id: Id,
    /// Chain hosting the validator manager.
    pub chain_id: Id,
    /// Validator manager address on `chain_id`.
    pub address: Vec<u8>,
    pub validators: Vec<L1Validator>,
    pub subnet_auth: Authorization,
}

impl Packable for ConvertSubnetToL1Tx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(packer)?;
        self.subnet_id.pack(packer)?;
        self.chain_id.pack(packer)?;
        packer.pack_bytes(&self.address)?;
        packer.pack_vec(&self.validators)?;
        self.subnet_auth.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(unpacker)?,
            subnet_id: Id::unpack(unpacker)?,
            chain_id: Id::unpack(unpacker)?,
            address: unpacker.unpack_bytes()?,
            validators: unpacker.unpack_vec()?,
            subnet_auth: Authorization::unpack(unpacker)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterL1ValidatorTx {
    pub base: BaseTx,
    pub balance: u64,
    pub proof_of_possession: [u8; BLS_POP_LEN],
    pub message: Vec<u8>,
}

impl Packable for RegisterL1ValidatorTx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(packer)?;
        packer.pack_u64(self.balance);
        packer.pack_fixed(&self.proof_of_possession);
        packer.pack_bytes(&self.message)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(unpacker)?,
            balance: unpacker.unpack_u64()?,
            proof_of_possession: unpacker.unpack_fixed()?,
            message: unpacker.unpack_bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetL1ValidatorWeightTx {
    pub base: BaseTx,
    pub message: Vec<u8>,
}

impl Packable for SetL1ValidatorWeightTx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(packer)?;
        packer.pack_bytes(&self.message)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(unpacker)?,
            message: unpacker.unpack_bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncreaseL1ValidatorBalanceTx {
    pub base: BaseTx,
    pub validation_id: Id,
    pub balance: u64,
}

impl Packable for IncreaseL1ValidatorBalanceTx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(packer)?;
        self.validation_id.pack(packer)?;
        packer.pack_u64(self.balance);
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(unpacker)?,
            validation_id: Id::unpack(unpacker)?,
            balance: unpacker.unpack_u64()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisableL1ValidatorTx {
    pub base: BaseTx,
    pub validation_id: Id,
    pub disable_auth: Authorization,
}

impl Packable for DisableL1ValidatorTx {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(packer)?;
        self.validation_id.pack(packer)?;
        self.disable_auth.pack(packer)
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(unpacker)?,
            validation_id: Id::unpack(unpacker)?,
            disable_auth: Authorization::unpack(unpacker)?,
        })
    }
}

/// Unsigned transaction, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnsignedTx {
    CreateSubnet(CreateSubnetTx),
    Base(BaseTx),
    ConvertSubnetToL1(ConvertSubnetToL1Tx),
    RegisterL1Validator(RegisterL1ValidatorTx),
    SetL1ValidatorWeight(SetL1ValidatorWeightTx),
    IncreaseL1ValidatorBalance(IncreaseL1ValidatorBalanceTx),
    DisableL1Validator(DisableL1ValidatorTx),
    /// Recognised kind whose body is not modeled. Holds every byte after the
    /// type id, credentials included.
    Opaque { kind: TxKind, body: Vec<u8> },
}

impl UnsignedTx {
    pub fn kind(&self) -> TxKind {
        match self {
            UnsignedTx::CreateSubnet(_) => TxKind::CreateSubnet,
            UnsignedTx::Base(_) => TxKind::Base,
            UnsignedTx::ConvertSubnetToL1(_) => TxKind::ConvertSubnetToL1,
            UnsignedTx::RegisterL1Validator(_) => TxKind::RegisterL1Validator,
            UnsignedTx::SetL1ValidatorWeight(_) => TxKind::SetL1ValidatorWeight,
            UnsignedTx::IncreaseL1ValidatorBalance(_) => TxKind::IncreaseL1ValidatorBalance,
            UnsignedTx::DisableL1Validator(_) => TxKind::DisableL1Validator,
            UnsignedTx::Opaque { kind, .. } => *kind,
        }
    }

    fn pack_body(&self, packer: &mut Packer) -> Result<(), CodecError> {
        match self {
            UnsignedTx::CreateSubnet(tx) => tx.pack(packer),
            UnsignedTx::Base(tx) => tx.pack(packer),
            UnsignedTx::ConvertSubnetToL1(tx) => tx.pack(packer),
            UnsignedTx::RegisterL1Validator(tx) => tx.pack(packer),
            UnsignedTx::SetL1ValidatorWeight(tx) => tx.pack(packer),
            UnsignedTx::IncreaseL1ValidatorBalance(tx) => tx.pack(packer),
            UnsignedTx::DisableL1Validator(tx) => tx.pack(packer),
            UnsignedTx::Opaque { body, .. } => {
                packer.pack_fixed(body);
                Ok(())
            }
        }
    }

    fn unpack_body(kind: TxKind, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let tx = match kind {
            TxKind::CreateSubnet => UnsignedTx::CreateSubnet(CreateSubnetTx::unpack(unpacker)?),
            TxKind::Base => UnsignedTx::Base(BaseTx::unpack(unpacker)?),
            TxKind::ConvertSubnetToL1 => {
                UnsignedTx::ConvertSubnetToL1(ConvertSubnetToL1Tx::unpack(unpacker)?)
            }
            TxKind::RegisterL1Validator => {
                UnsignedTx::RegisterL1Validator(RegisterL1ValidatorTx::unpack(unpacker)?)
            }
            TxKind::SetL1ValidatorWeight => {
                UnsignedTx::SetL1ValidatorWeight(SetL1ValidatorWeightTx::unpack(unpacker)?)
            }
            TxKind::IncreaseL1ValidatorBalance => UnsignedTx::IncreaseL1ValidatorBalance(
                IncreaseL1ValidatorBalanceTx::unpack(unpacker)?,
            ),
            TxKind::DisableL1Validator => {
                UnsignedTx::DisableL1Validator(DisableL1ValidatorTx::unpack(unpacker)?)
            }
            kind => UnsignedTx::Opaque {
                kind,
                body: unpacker.unpack_rest().to_vec(),
            },
        };
        Ok(tx)
    }
}

// =============================================================================
// Signed transaction
// =============================================================================

/// A decoded and initialised signed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    pub unsigned: UnsignedTx,
    pub credentials: Vec<Credential>,
    id: Id,
    bytes: Vec<u8>,
}

impl Tx {
    /// Build and initialise a transaction from its parts.
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Result<Self, CodecError> {
        let mut tx = Self {
            unsigned,
            credentials,
            id: Id::EMPTY,
            bytes: Vec::new(),
        };
        tx.bytes = tx.encode()?;
        tx.id = Id(sha256(&tx.bytes));
        Ok(tx)
    }

    /// Decode signed transaction bytes and initialise the result.
    ///
    /// Initialisation re-encodes the decoded value; bytes that do not
    /// reproduce exactly are rejected as non-canonical.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::versioned(bytes)?;
        let raw_type = unpacker.unpack_u32()?;
        let kind = TxKind::from_type_id(raw_type).ok_or(CodecError::UnknownTypeId {
            context: "unsigned transaction",
            type_id: raw_type,
        })?;
        let unsigned = UnsignedTx::unpack_body(kind, &mut unpacker)?;
        let credentials = match unsigned {
            UnsignedTx::Opaque { .. } => Vec::new(),
            _ => unpacker.unpack_vec()?,
        };
        unpacker.finish()?;

        let tx = Self::new(unsigned, credentials)?;
        if tx.bytes != bytes {
            return Err(CodecError::NonCanonical);
        }
        Ok(tx)
    }

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::versioned();
        packer.pack_u32(self.unsigned.kind().type_id());
        self.unsigned.pack_body(&mut packer)?;
        if !matches!(self.unsigned, UnsignedTx::Opaque { .. }) {
            packer.pack_vec(&self.credentials)?;
        }
        Ok(packer.into_bytes())
    }

    /// Encoding of the unsigned part (what the credentials sign).
    #[cfg(test)]
    pub(crate) fn unsigned_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::versioned();
        packer.pack_u32(self.unsigned.kind().type_id());
        self.unsigned.pack_body(&mut packer)?;
        Ok(packer.into_bytes())
    }

    /// SHA-256 of the signed bytes.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Canonical signed bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> TxKind {
        self.unsigned.kind()
    }
}
