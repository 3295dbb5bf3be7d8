//! # Error Types
//!
//! Errors raised while parsing identifiers and encoded strings.

use thiserror::Error;

/// Errors produced when decoding CB58 / checksummed hex strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormattingError {
    /// The string is not valid base58.
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    /// The string is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Hex strings must carry the `0x` prefix.
    #[error("Missing 0x prefix")]
    MissingHexPrefix,

    /// Decoded payload is shorter than the checksum.
    #[error("Input too short: {len} bytes")]
    TooShort { len: usize },

    /// Trailing checksum does not match the payload.
    #[error("Checksum mismatch")]
    BadChecksum,
}

/// Errors produced when building identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    /// Identifier has the wrong number of bytes.
    #[error("Invalid identifier length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Node IDs must start with `NodeID-`.
    #[error("Missing NodeID- prefix in {0:?}")]
    MissingNodeIdPrefix(String),

    /// Underlying string encoding was malformed.
    #[error(transparent)]
    Formatting(#[from] FormattingError),
}
