//! # Domain Errors
//!
//! Error types for message derivation.
//!
//! Every error here is terminal for a run: a structurally invalid input
//! cannot become valid by retrying.

use super::transaction::TxKind;
use shared_types::{FormattingError, Id};
use thiserror::Error;

/// Linear codec failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a field could be read.
    #[error("Short buffer: needed {needed} bytes, {remaining} remaining")]
    ShortBuffer { needed: usize, remaining: usize },

    /// Leading codec version is not supported.
    #[error("Unknown codec version: {0}")]
    UnknownVersion(u16),

    /// Input was not fully consumed.
    #[error("Trailing bytes after decoding: {0}")]
    TrailingBytes(usize),

    /// A length does not fit the `u32` prefix.
    #[error("Length overflow: {len}")]
    LengthOverflow { len: usize },

    /// Interface type id not registered for this position.
    #[error("Unknown type id {type_id} for {context}")]
    UnknownTypeId { context: &'static str, type_id: u32 },

    /// Decoded value re-encodes to different bytes.
    #[error("Non-canonical encoding")]
    NonCanonical,
}

/// Ledger data-fetch failures.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The ledger has no transaction with this ID.
    #[error("Transaction not found: {0}")]
    NotFound(Id),

    /// The request did not complete within the timeout.
    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Transport or API failure.
    #[error("Ledger request failed: {0}")]
    Transport(String),

    /// Returned bytes were not correctly encoded.
    #[error("Malformed ledger response: {0}")]
    Malformed(#[from] FormattingError),

    /// Returned bytes hash to a different transaction ID.
    #[error("Transaction ID mismatch: requested {requested}, received {received}")]
    IdMismatch { requested: Id, received: Id },
}

/// Message derivation failures.
#[derive(Debug, Clone, Error)]
pub enum DerivationError {
    /// Transaction lookup failed.
    #[error("Failed to fetch transaction: {0}")]
    Fetch(#[from] FetchError),

    /// Transaction bytes did not decode or initialise.
    #[error("Failed to decode transaction: {0}")]
    Decode(#[source] CodecError),

    /// Decoded transaction is not a subnet-to-L1 conversion.
    #[error("Unexpected transaction type: {0}")]
    UnexpectedTransactionType(TxKind),

    /// Identifier or payload construction failed.
    #[error("Failed to build attestation message: {0}")]
    Derivation(#[source] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_buffer_error() {
        let err = CodecError::ShortBuffer {
            needed: 32,
            remaining: 3,
        };
        assert!(err.to_string().contains("needed 32 bytes, 3 remaining"));
    }

    #[test]
    fn test_unexpected_type_names_kind() {
        let err = DerivationError::UnexpectedTransactionType(TxKind::Base);
        assert!(err.to_string().contains("BaseTx"));
    }

    #[test]
    fn test_fetch_error_wraps() {
        let err = DerivationError::from(FetchError::NotFound(Id::EMPTY));
        assert!(err.to_string().starts_with("Failed to fetch transaction"));
    }

    #[test]
    fn test_decode_error_keeps_source() {
        use std::error::Error as _;
        let err = DerivationError::Decode(CodecError::TrailingBytes(4));
        assert!(err.source().is_some());
    }
}
