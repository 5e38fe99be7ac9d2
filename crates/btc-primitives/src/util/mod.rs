//! Binary serialization helpers.
//!
//! Provides `VarInt` (the compact-size integer used for transaction
//! counts and script lengths) and the `ByteReader` / `ByteWriter` cursor
//! types used to decode and encode transactions.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// A Bitcoin protocol variable-length integer.
///
/// Values below 0xfd occupy one byte; larger values are prefixed with
/// 0xfd, 0xfe or 0xff followed by a 2, 4 or 8-byte little-endian integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Return the wire-format byte length of this VarInt (1, 3, 5 or 9).
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode the VarInt into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.0;
        let mut buf = Vec::with_capacity(self.length());
        match self.length() {
            1 => buf.push(v as u8),
            3 => {
                buf.push(0xfd);
                buf.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                buf.push(0xfe);
                buf.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        buf
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor-based reader over little-endian protocol data.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Read exactly `n` bytes, borrowing them from the underlying slice.
    ///
    /// # Returns
    /// `Ok(&[u8])` of length `n`, or `UnexpectedEof` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if self.remaining() < n {
            return Err(PrimitivesError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a VarInt.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        let value = match self.read_u8()? {
            0xff => self.read_u64_le()?,
            0xfe => self.read_u32_le()? as u64,
            0xfd => self.read_u16_le()? as u64,
            b => b as u64,
        };
        Ok(VarInt(value))
    }

    /// Read a VarInt length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_varint()?.value();
        let len = usize::try_from(len).map_err(|_| PrimitivesError::VarIntTooLarge)?;
        self.read_bytes(len)
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// An append-only little-endian byte buffer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create an empty writer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a VarInt.
    pub fn write_varint(&mut self, varint: VarInt) {
        self.buf.extend_from_slice(&varint.to_bytes());
    }

    /// Append a VarInt length prefix followed by `bytes`.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(VarInt::from(bytes.len()));
        self.write_bytes(bytes);
    }

    /// Consume the writer and return the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
