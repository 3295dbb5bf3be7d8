//! # Signer Bit Set
//!
//! Bit *i* marks canonical validator *i* as a signer. The wire form is the
//! minimal big-endian byte string of the set read as an unsigned integer;
//! a leading zero byte is non-canonical.

use ws_01_message_derivation::CodecError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignerBitSet {
    /// Little-endian bytes: bit `i` lives in `bytes[i / 8]`.
    bytes: Vec<u8>,
}

impl SignerBitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, index: usize) {
        let byte = index / 8;
        if self.bytes.len() <= byte {
            self.bytes.resize(byte + 1, 0);
        }
        self.bytes[byte] |= 1 << (index % 8);
    }

    pub fn contains(&self, index: usize) -> bool {
        self.bytes
            .get(index / 8)
            .is_some_and(|b| b & (1 << (index % 8)) != 0)
    }

    /// Number of signers.
    pub fn count(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Index of the highest set bit plus one.
    pub fn bit_len(&self) -> usize {
        match self.bytes.iter().rposition(|b| *b != 0) {
            Some(i) => i * 8 + (8 - self.bytes[i].leading_zeros() as usize),
            None => 0,
        }
    }

    /// Set bit indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bit_len()).filter(|i| self.contains(*i))
    }

    /// Minimal big-endian encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let used = self.bit_len().div_ceil(8);
        self.bytes[..used].iter().rev().copied().collect()
    }

    /// Parse the big-endian encoding, rejecting a leading zero byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.first() == Some(&0) {
            return Err(CodecError::NonCanonical);
        }
        Ok(Self {
            bytes: bytes.iter().rev().copied().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let set = SignerBitSet::new();
        assert_eq!(set.bit_len(), 0);
        assert_eq!(set.count(), 0);
        assert!(set.to_bytes().is_empty());
    }

    #[test]
    fn test_bits_map_to_big_endian_bytes() {
        let mut set = SignerBitSet::new();
        set.add(0);
        set.add(2);
        assert_eq!(set.to_bytes(), vec![0b0000_0101]);

        set.add(9);
        assert_eq!(set.to_bytes(), vec![0b0000_0010, 0b0000_0101]);
        assert_eq!(set.bit_len(), 10);
        assert_eq!(set.count(), 3);
    }

    #[test]
    fn test_indices_ascending() {
        let mut set = SignerBitSet::new();
        for i in [17, 3, 8] {
            set.add(i);
        }
        assert_eq!(set.indices().collect::<Vec<_>>(), vec![3, 8, 17]);
    }

    #[test]
    fn test_parse_matches_encoding() {
        let mut set = SignerBitSet::new();
        set.add(1);
        set.add(15);
        let parsed = SignerBitSet::from_bytes(&set.to_bytes()).unwrap();
        assert!(parsed.contains(1));
        assert!(parsed.contains(15));
        assert!(!parsed.contains(2));
        assert_eq!(parsed.to_bytes(), set.to_bytes());
    }

    #[test]
    fn test_leading_zero_rejected() {
        assert_eq!(
            SignerBitSet::from_bytes(&[0, 1]),
            Err(CodecError::NonCanonical)
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = SignerBitSet::new();
        set.add(5);
        set.add(5);
        assert_eq!(set.count(), 1);
    }
}
