//! Bit-level reader for the DEFLATE decoder.
//!
//! `BitReader` reads LSB-first bit fields from an in-memory slice. Bits are
//! packed starting from the least significant bit of each byte, which is the
//! order RFC 1951 uses for everything except Huffman codes themselves.
//!
//! The reader keeps a 64-bit accumulator that is refilled a byte at a time.
//! Whenever input remains, a refill leaves at least 57 bits buffered, so the
//! Huffman decoder always has more lookahead than the longest code needs.
//!
//! # Example
//!
//! ```
//! use oxibin_core::BitReader;
//!
//! let data = [0b1010_1101, 0xFF];
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.bits(3).unwrap(), 0b101);
//! assert_eq!(reader.bits(5).unwrap(), 0b10101);
//! assert_eq!(reader.bits(8).unwrap(), 0xFF);
//! assert!(reader.bits(1).is_err());
//! ```

use crate::error::{OxiBinError, Result};

/// An LSB-first bit reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source bytes.
    data: &'a [u8],
    /// Next byte to move into the accumulator.
    next_byte: usize,
    /// Bit accumulator (LSB-first).
    buffer: u64,
    /// Number of valid bits in the accumulator.
    bits_in_buffer: u32,
    /// Total bits consumed (for error reporting).
    bits_consumed: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            next_byte: 0,
            buffer: 0,
            bits_in_buffer: 0,
            bits_consumed: 0,
        }
    }

    /// Number of bits consumed so far.
    #[inline]
    pub fn bit_position(&self) -> u64 {
        self.bits_consumed
    }

    /// Index of the byte holding the next unread bit.
    #[inline]
    pub fn byte_position(&self) -> usize {
        (self.bits_consumed / 8) as usize
    }

    /// Bits still available, buffered or not.
    pub fn available_bits(&self) -> u64 {
        self.bits_in_buffer as u64 + ((self.data.len() - self.next_byte) as u64) * 8
    }

    /// Whether every bit of input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.available_bits() == 0
    }

    #[inline]
    fn refill(&mut self) {
        while self.bits_in_buffer <= 56 && self.next_byte < self.data.len() {
            self.buffer |= (self.data[self.next_byte] as u64) << self.bits_in_buffer;
            self.next_byte += 1;
            self.bits_in_buffer += 8;
        }
    }

    /// Peek at the next 32 bits without consuming them.
    ///
    /// Past the end of input the missing high bits read as zero. Callers
    /// must still [`consume`](Self::consume) only what the input holds.
    #[inline]
    pub fn peek_bits(&mut self) -> u32 {
        if self.bits_in_buffer < 32 {
            self.refill();
        }
        self.buffer as u32
    }

    /// Drop `count` bits (at most 32) that were previously peeked.
    #[inline]
    pub fn consume(&mut self, count: u32) -> Result<()> {
        debug_assert!(count <= 32, "Cannot consume more than 32 bits at once");
        if self.bits_in_buffer < count {
            self.refill();
            if self.bits_in_buffer < count {
                return Err(OxiBinError::unexpected_eof(self.bits_consumed));
            }
        }
        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.bits_consumed += count as u64;
        Ok(())
    }

    /// Read `count` bits (0-32), first bit in the LSB position.
    #[inline]
    pub fn bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");
        if count == 0 {
            return Ok(0);
        }
        let value = self.peek_bits() as u64 & ((1u64 << count) - 1);
        self.consume(count)?;
        Ok(value as u32)
    }

    /// Read `count` bits and add them to `base`.
    ///
    /// This is the shape of every DEFLATE extra-bits field.
    #[inline]
    pub fn bits_base(&mut self, count: u32, base: u32) -> Result<u32> {
        Ok(base + self.bits(count)?)
    }

    /// Skip to the next byte boundary.
    ///
    /// Partial bits are discarded and whole bytes still sitting in the
    /// accumulator are handed back to the byte stream.
    pub fn align_to_byte(&mut self) {
        let partial = self.bits_in_buffer % 8;
        self.bits_consumed += partial as u64;
        self.next_byte -= (self.bits_in_buffer / 8) as usize;
        self.buffer = 0;
        self.bits_in_buffer = 0;
    }

    /// Align to a byte boundary and read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Align to a byte boundary and borrow the next `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.align_to_byte();
        let start = self.next_byte;
        let end = match start.checked_add(count) {
            Some(end) if end <= self.data.len() => end,
            _ => return Err(OxiBinError::out_of_range(start, count, self.data.len())),
        };
        self.next_byte = end;
        self.bits_consumed += count as u64 * 8;
        Ok(&self.data[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_across_bytes() {
        let data = [0b1100_0101, 0b0000_0011];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.bits(1).unwrap(), 1);
        assert_eq!(reader.bits(2).unwrap(), 0b10);
        assert_eq!(reader.bits(7).unwrap(), 0b11_11000);
        assert_eq!(reader.bit_position(), 10);
        assert_eq!(reader.byte_position(), 1);
        assert_eq!(reader.bits(6).unwrap(), 0);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_bits_base() {
        let data = [0b0000_0110];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.bits_base(3, 257).unwrap(), 263);
    }

    #[test]
    fn test_peek_is_zero_padded() {
        let data = [0xAB];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.peek_bits(), 0xAB);
        reader.consume(8).unwrap();
        assert_eq!(reader.peek_bits(), 0);
        assert!(matches!(
            reader.consume(1),
            Err(OxiBinError::UnexpectedEof { bit_position: 8 })
        ));
    }

    #[test]
    fn test_align_returns_buffered_bytes() {
        let data = [0xFF, 0x34, 0x12, 0x78, 0x56, 0x99];
        let mut reader = BitReader::new(&data);

        // Pulls the whole slice into the accumulator.
        assert_eq!(reader.bits(3).unwrap(), 0b111);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_bytes(2).unwrap(), &[0x78, 0x56]);
        assert_eq!(reader.byte_position(), 5);
        assert_eq!(reader.bits(8).unwrap(), 0x99);
    }

    #[test]
    fn test_read_bytes_out_of_range() {
        let data = [0x01, 0x02];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bytes(3).is_err());
        assert_eq!(reader.read_bytes(2).unwrap(), &[0x01, 0x02]);
    }

    #[test]
    fn test_available_bits() {
        let data = [0u8; 10];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.available_bits(), 80);
        reader.bits(13).unwrap();
        assert_eq!(reader.available_bits(), 67);
    }
}
