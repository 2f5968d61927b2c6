//! Canonical Huffman decoding for DEFLATE.
//!
//! A canonical code is fully determined by its per-symbol bit lengths, so
//! the tree stores only two things: how many codes exist at each length, and
//! the symbols sorted by (length, symbol). Decoding widens a candidate code
//! one bit at a time and subtracts the count at each length until the
//! candidate lands inside that length's range.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-287 (0-255 literals, 256 end-of-block, 257-285 lengths)
//! - **Distance**: 0-31 (only 0-29 are valid)
//! - **Code Length**: 0-18 (dynamic block headers)

use oxibin_core::BitReader;
use oxibin_core::error::{OxiBinError, Result};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// A canonical Huffman decode table.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Number of codes of each bit length. `counts[0]` is always 0.
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols ordered by code length, then by symbol value.
    symbols: Vec<u16>,
}

impl HuffmanTree {
    /// Build a tree from per-symbol code lengths (0 = unused symbol).
    ///
    /// Lengths above 15 and over-subscribed codes are rejected. Incomplete
    /// codes are accepted, since a dynamic block may legally carry a single
    /// distance code.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        for &len in code_lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(OxiBinError::invalid_huffman(0));
            }
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        let mut left: i32 = 1;
        for &count in &counts[1..] {
            left = (left << 1) - count as i32;
            if left < 0 {
                return Err(OxiBinError::invalid_huffman(0));
            }
        }

        Ok(Self::build(code_lengths, counts))
    }

    /// Build a tree from lengths known to form a valid code.
    pub(crate) fn from_complete_lengths(code_lengths: &[u8]) -> Self {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        for &len in code_lengths {
            counts[(len as usize).min(MAX_CODE_LENGTH)] += 1;
        }
        counts[0] = 0;
        Self::build(code_lengths, counts)
    }

    fn build(code_lengths: &[u8], counts: [u16; MAX_CODE_LENGTH + 1]) -> Self {
        // Starting index of each length in the sorted symbol table.
        let mut offsets = [0u16; MAX_CODE_LENGTH + 2];
        for len in 1..=MAX_CODE_LENGTH {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let mut symbols = vec![0u16; offsets[MAX_CODE_LENGTH + 1] as usize];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            let len = len as usize;
            if len != 0 && len <= MAX_CODE_LENGTH {
                symbols[offsets[len] as usize] = symbol as u16;
                offsets[len] += 1;
            }
        }

        Self { counts, symbols }
    }

    /// Number of symbols with a non-zero code length.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the tree has no codes at all.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Decode one symbol.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let bits = reader.peek_bits();
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=MAX_CODE_LENGTH {
            code |= ((bits >> (len - 1)) & 1) as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                reader.consume(len as u32)?;
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(OxiBinError::invalid_huffman(reader.bit_position()))
    }
}
