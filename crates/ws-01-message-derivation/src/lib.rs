//! # WS-01 Message Derivation
//!
//! Turns a subnet-to-L1 conversion transaction into the canonical unsigned
//! attestation message that validators sign.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Flow
//!
//! 1. Fetch signed transaction bytes from the ledger by ID
//! 2. Decode and initialise the transaction, rejecting every other kind
//! 3. Hash the conversion record into the conversion ID
//! 4. Wrap the ID as `UnsignedMessage(network, P-chain, AddressedCall(payload))`
//!
//! ## Module Structure
//!
//! ```text
//! ws-01-message-derivation/
//! ├── domain/          # Codec, transactions, conversion record, messages
//! ├── ports/           # MessageDerivationApi, LedgerClient
//! ├── adapters/        # JSON-RPC platform client
//! └── service.rs       # MessageDerivationService
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{JsonRpcClient, PlatformLedgerClient, RpcError, RpcErrorObject};
pub use domain::{
    derive_from_tx, derive_message, AddressedCall, CodecError, ConversionPayload,
    ConversionRecord, ConversionValidator, DerivationError, DerivedMessage, FetchError, Packable,
    Packer, Tx, TxKind, Unpacker, UnsignedMessage, UnsignedTx, CODEC_VERSION, FUJI_ID, LOCAL_ID,
    MAINNET_ID, PLATFORM_CHAIN_ID,
};
pub use ports::{LedgerClient, MessageDerivationApi, MockLedgerClient};
pub use service::{MessageDerivationService, DEFAULT_FETCH_TIMEOUT};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
