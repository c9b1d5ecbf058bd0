//! Little-endian binary buffers
//!
//! All integers are 4-byte `i32` and all floats are 4-byte IEEE-754, written
//! little-endian regardless of host. Reads never panic: running off the end
//! or meeting an impossible length yields a [`BufferError`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    EndOfBuffer { needed: usize, remaining: usize },
    #[error("invalid length prefix {0}")]
    InvalidLength(i32),
    #[error("invalid {what} value {value}")]
    InvalidValue { what: &'static str, value: i32 },
    #[error("malformed data: {0}")]
    Malformed(&'static str),
}

/// Growable write buffer
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    bytes: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a collection length as an `i32` prefix
    pub fn write_len(&mut self, len: usize) {
        debug_assert!(len <= i32::MAX as usize);
        self.write_i32(len as i32);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Cursor over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], BufferError> {
        if count > self.remaining() {
            return Err(BufferError::EndOfBuffer {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32, BufferError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, BufferError> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read an `i32` length prefix for items at least `min_item_size` bytes
    /// long. Negative lengths, and lengths that could not fit in the rest of
    /// the buffer, are rejected before anything is allocated.
    pub fn read_len(&mut self, min_item_size: usize) -> Result<usize, BufferError> {
        let raw = self.read_i32()?;
        let len = usize::try_from(raw).map_err(|_| BufferError::InvalidLength(raw))?;
        let needed = len.saturating_mul(min_item_size);
        if needed > self.remaining() {
            return Err(BufferError::EndOfBuffer {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }
}

/// Types with a stable binary encoding
pub trait BinarySerialize: Sized {
    fn serialize(&self, writer: &mut BinaryWriter);
    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError>;

    /// Encode into a fresh byte vector
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize(&mut writer);
        writer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, BufferError> {
        Self::deserialize(&mut BinaryReader::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(1);
        writer.write_f32(1.0);
        assert_eq!(writer.as_bytes(), &[1, 0, 0, 0, 0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn test_read_back() {
        let mut writer = BinaryWriter::new();
        writer.write_bytes(b"ab");
        writer.write_i32(-7);
        writer.write_f32(f32::from_bits(0x7fc0_0001));
        let bytes = writer.into_bytes();

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_bytes(2).unwrap(), b"ab");
        assert_eq!(reader.read_i32().unwrap(), -7);
        // Bit-exact, even for NaN payloads
        assert_eq!(reader.read_f32().unwrap().to_bits(), 0x7fc0_0001);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_short_read_is_error() {
        let mut reader = BinaryReader::new(&[1, 2, 3]);
        assert_eq!(
            reader.read_i32(),
            Err(BufferError::EndOfBuffer {
                needed: 4,
                remaining: 3
            })
        );
        // Cursor did not move
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_length_guards() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-1);
        let bytes = writer.into_bytes();
        assert_eq!(
            BinaryReader::new(&bytes).read_len(4),
            Err(BufferError::InvalidLength(-1))
        );

        let mut writer = BinaryWriter::new();
        writer.write_len(1_000_000);
        writer.write_i32(0);
        let bytes = writer.into_bytes();
        assert!(matches!(
            BinaryReader::new(&bytes).read_len(4),
            Err(BufferError::EndOfBuffer { .. })
        ));
    }
}
