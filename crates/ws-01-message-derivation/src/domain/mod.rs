//! # Domain Module
//!
//! Ledger transaction model, linear codec and attestation message types.

pub mod codec;
pub mod conversion;
pub mod derivation;
pub mod errors;
pub mod transaction;
pub mod warp;

pub use codec::{Packable, Packer, Unpacker, CODEC_VERSION};
pub use conversion::{ConversionRecord, ConversionValidator};
pub use derivation::{derive_from_tx, derive_message, DerivedMessage};
pub use errors::*;
pub use transaction::*;
pub use warp::*;
