//! # Linear Codec
//!
//! Big-endian, length-prefixed binary codec shared by ledger transactions and
//! attestation messages. Every top-level encoding starts with a `u16` codec
//! version.
//!
//! ## Rules
//!
//! - Fixed-size arrays are written raw
//! - Byte slices and sequences carry a `u32` length / element count
//! - Interface values carry a `u32` type id before their fields
//! - Decoding must consume the whole input

use super::errors::CodecError;
use shared_types::{Id, ShortId};

/// The only codec version in use.
pub const CODEC_VERSION: u16 = 0;

/// Growable output buffer.
#[derive(Debug, Default)]
pub struct Packer {
    bytes: Vec<u8>,
}

impl Packer {
    /// Create an empty packer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a packer with the codec version already written.
    pub fn versioned() -> Self {
        let mut packer = Self::new();
        packer.pack_u16(CODEC_VERSION);
        packer
    }

    pub fn pack_u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn pack_u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn pack_u64(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a fixed-size value without a length prefix.
    pub fn pack_fixed(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Write a `u32` length prefix followed by the bytes.
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.pack_len(bytes.len())?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a `u32` element count.
    pub fn pack_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
        self.pack_u32(len);
        Ok(())
    }

    /// Write a counted sequence.
    pub fn pack_vec<T: Packable>(&mut self, items: &[T]) -> Result<(), CodecError> {
        self.pack_len(items.len())?;
        for item in items {
            item.pack(self)?;
        }
        Ok(())
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Cursor over an input buffer.
#[derive(Debug)]
pub struct Unpacker<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Create an unpacker and check the leading codec version.
    pub fn versioned(bytes: &'a [u8]) -> Result<Self, CodecError> {
        let mut unpacker = Self::new(bytes);
        let version = unpacker.unpack_u16()?;
        if version != CODEC_VERSION {
            return Err(CodecError::UnknownVersion(version));
        }
        Ok(unpacker)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::ShortBuffer {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    pub fn unpack_u16(&mut self) -> Result<u16, CodecError> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(buf))
    }

    pub fn unpack_u32(&mut self) -> Result<u32, CodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    pub fn unpack_u64(&mut self) -> Result<u64, CodecError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn unpack_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    /// Read a `u32` count, rejecting counts larger than the remaining input.
    pub fn unpack_len(&mut self) -> Result<usize, CodecError> {
        let len = self.unpack_u32()? as usize;
        if len > self.remaining() {
            return Err(CodecError::ShortBuffer {
                needed: len,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    pub fn unpack_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.unpack_len()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn unpack_vec<T: Packable>(&mut self) -> Result<Vec<T>, CodecError> {
        let len = self.unpack_len()?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::unpack(self)?);
        }
        Ok(items)
    }

    /// Everything not yet read.
    pub fn unpack_rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        rest
    }

    /// Require that the whole input was consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// Types with a linear-codec representation.
pub trait Packable: Sized {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError>;
    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError>;
}

/// Encode a value behind the codec version.
pub fn encode<T: Packable>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut packer = Packer::versioned();
    value.pack(&mut packer)?;
    Ok(packer.into_bytes())
}

/// Decode a versioned value, requiring the input to be fully consumed.
pub fn decode<T: Packable>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut unpacker = Unpacker::versioned(bytes)?;
    let value = T::unpack(&mut unpacker)?;
    unpacker.finish()?;
    Ok(value)
}

impl Packable for u32 {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(*self);
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        unpacker.unpack_u32()
    }
}

impl Packable for Id {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes());
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Id(unpacker.unpack_fixed()?))
    }
}

impl Packable for ShortId {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes());
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(ShortId(unpacker.unpack_fixed()?))
    }
}

impl<const N: usize> Packable for [u8; N] {
    fn pack(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self);
        Ok(())
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        unpacker.unpack_fixed()
    }
}
