//! Bounds-checked forward cursor over an in-memory byte buffer.
//!
//! `ByteCursor` is the leaf of every decoder in OxiBin. It borrows the
//! buffer rather than copying it, so the slices it hands out share the
//! lifetime of the source data.
//!
//! # Example
//!
//! ```
//! use oxibin_core::ByteCursor;
//!
//! let data = [0x50, 0x4B, 0x05, 0x06, 0x2A, 0x00];
//! let mut cursor = ByteCursor::new(&data);
//! assert_eq!(cursor.read(4).unwrap(), b"PK\x05\x06");
//! assert_eq!(cursor.read_u16_le().unwrap(), 42);
//! assert!(cursor.is_at_end());
//! ```

use crate::error::{OxiBinError, Result};

/// A forward cursor over a borrowed byte slice.
///
/// The position never exceeds the buffer length. Every read checks
/// `position + size <= length` before touching the buffer and fails with
/// [`OxiBinError::OutOfRange`] otherwise.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at offset 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// The underlying buffer.
    pub fn get_ref(&self) -> &'a [u8] {
        self.data
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Whether the cursor has consumed the whole buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Check that `size` more bytes are available.
    #[inline]
    pub fn ensure(&self, size: usize) -> Result<()> {
        match self.position.checked_add(size) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(OxiBinError::out_of_range(
                self.position,
                size,
                self.data.len(),
            )),
        }
    }

    /// Move to an absolute position.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(OxiBinError::out_of_range(position, 0, self.data.len()));
        }
        self.position = position;
        Ok(())
    }

    /// Advance by `count` bytes.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.position += count;
        Ok(())
    }

    /// Borrow the next `count` bytes without advancing.
    pub fn peek(&self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        Ok(&self.data[self.position..self.position + count])
    }

    /// Borrow the next `count` bytes and advance past them.
    #[inline]
    pub fn read(&mut self, count: usize) -> Result<&'a [u8]> {
        let slice = self.peek(count)?;
        self.position += count;
        Ok(slice)
    }

    /// Borrow everything from the current position to the end.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Read `N` bytes into a fixed-size array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let byte = self.data[self.position];
        self.position += 1;
        Ok(byte)
    }

    /// Read a little-endian `u16`.
    #[inline]
    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u32`.
    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u64`.
    #[inline]
    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read `count` bytes and return a new cursor over them.
    pub fn sub_cursor(&mut self, count: usize) -> Result<ByteCursor<'a>> {
        Ok(ByteCursor::new(self.read(count)?))
    }
}
