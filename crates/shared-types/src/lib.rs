//! # Shared Types Crate
//!
//! Identifier types used across the signer subsystems, together with the
//! text encodings the ledger APIs speak.
//!
//! ## Contents
//!
//! - **Identifiers**: [`Id`] (32 bytes), [`ShortId`] and [`NodeId`] (20 bytes)
//! - **Formatting**: CB58 and checksummed hex, both with a 4-byte SHA-256 tail
//! - **Hashing**: [`sha256`], the single digest function of the wire formats

pub mod errors;
pub mod formatting;
pub mod ids;

pub use errors::*;
pub use formatting::{sha256, CHECKSUM_LEN};
pub use ids::*;
