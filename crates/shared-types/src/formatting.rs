//! # String Formatting
//!
//! CB58 and checksummed hex, the two text encodings used by the ledger's
//! JSON APIs. Both append the last [`CHECKSUM_LEN`] bytes of the payload's
//! SHA-256 digest before encoding.

use crate::errors::FormattingError;
use sha2::{Digest, Sha256};

/// Number of checksum bytes appended to encoded payloads.
pub const CHECKSUM_LEN: usize = 4;

/// SHA-256 digest of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256(bytes);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
    out
}

fn with_checksum(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + CHECKSUM_LEN);
    out.extend_from_slice(bytes);
    out.extend_from_slice(&checksum(bytes));
    out
}

fn strip_checksum(mut decoded: Vec<u8>) -> Result<Vec<u8>, FormattingError> {
    if decoded.len() < CHECKSUM_LEN {
        return Err(FormattingError::TooShort { len: decoded.len() });
    }
    let split = decoded.len() - CHECKSUM_LEN;
    if checksum(&decoded[..split]) != decoded[split..] {
        return Err(FormattingError::BadChecksum);
    }
    decoded.truncate(split);
    Ok(decoded)
}

/// Encode bytes as CB58.
pub fn encode_cb58(bytes: &[u8]) -> String {
    bs58::encode(with_checksum(bytes)).into_string()
}

/// Decode a CB58 string, verifying its checksum.
pub fn decode_cb58(s: &str) -> Result<Vec<u8>, FormattingError> {
    let decoded = bs58::decode(s)
        .into_vec()
        .map_err(|e| FormattingError::InvalidBase58(e.to_string()))?;
    strip_checksum(decoded)
}

/// Encode bytes as `0x`-prefixed hex with a checksum tail.
pub fn encode_hex_checksummed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(with_checksum(bytes)))
}

/// Decode `0x`-prefixed hex with a checksum tail.
pub fn decode_hex_checksummed(s: &str) -> Result<Vec<u8>, FormattingError> {
    let body = s
        .strip_prefix("0x")
        .ok_or(FormattingError::MissingHexPrefix)?;
    let decoded = hex::decode(body).map_err(|e| FormattingError::InvalidHex(e.to_string()))?;
    strip_checksum(decoded)
}

/// Decode `0x`-prefixed hex without a checksum (keys, signatures).
pub fn decode_hex_prefixed(s: &str) -> Result<Vec<u8>, FormattingError> {
    let body = s
        .strip_prefix("0x")
        .ok_or(FormattingError::MissingHexPrefix)?;
    hex::decode(body).map_err(|e| FormattingError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cb58_empty_id() {
        assert_eq!(
            encode_cb58(&[0u8; 32]),
            "11111111111111111111111111111111LpoYY"
        );
    }

    #[test]
    fn test_cb58_decode_roundtrip() {
        let bytes = [7u8; 20];
        let encoded = encode_cb58(&bytes);
        assert_eq!(decode_cb58(&encoded).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_cb58_bad_checksum() {
        // Flip the last character of a valid encoding.
        let mut encoded = encode_cb58(&[1u8; 32]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '2' { '3' } else { '2' });
        assert!(decode_cb58(&encoded).is_err());
    }

    #[test]
    fn test_cb58_rejects_non_base58() {
        assert!(matches!(
            decode_cb58("0OIl"),
            Err(FormattingError::InvalidBase58(_))
        ));
    }

    #[test]
    fn test_hex_checksummed() {
        let encoded = encode_hex_checksummed(b"payload");
        assert!(encoded.starts_with("0x"));
        assert_eq!(decode_hex_checksummed(&encoded).unwrap(), b"payload");
    }

    #[test]
    fn test_hex_requires_prefix() {
        assert_eq!(
            decode_hex_checksummed("deadbeef"),
            Err(FormattingError::MissingHexPrefix)
        );
    }

    #[test]
    fn test_hex_too_short() {
        assert_eq!(
            decode_hex_checksummed("0x0102"),
            Err(FormattingError::TooShort { len: 2 })
        );
    }

    #[test]
    fn test_hex_tampered_payload() {
        let mut encoded = encode_hex_checksummed(&[0xAA; 8]);
        encoded.replace_range(2..4, "ab");
        assert_eq!(
            decode_hex_checksummed(&encoded),
            Err(FormattingError::BadChecksum)
        );
    }
}
