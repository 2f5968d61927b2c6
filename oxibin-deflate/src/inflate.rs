//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! Input is always a resident slice; there is no streaming mode.

use crate::huffman::{END_OF_BLOCK, HuffmanTree};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_BASE, DISTANCE_EXTRA_BITS, LENGTH_BASE, LENGTH_EXTRA_BITS,
    fixed_distance_tree, fixed_litlen_tree,
};
use crate::window::OutputWindow;
use oxibin_core::BitReader;
use oxibin_core::error::{OxiBinError, Result};

/// Largest HLIT a dynamic block may declare.
const MAX_LITLEN_CODES: usize = 286;

/// Largest HDIST a dynamic block may declare.
const MAX_DISTANCE_CODES: usize = 30;

/// DEFLATE decompressor.
#[derive(Debug, Default)]
pub struct Inflater {
    /// Maximum output size, if bounded.
    output_limit: Option<u64>,
}

impl Inflater {
    /// Create a new DEFLATE decompressor.
    pub fn new() -> Self {
        Self { output_limit: None }
    }

    /// Create a decompressor that fails with `SizeMismatch` as soon as the
    /// output grows past `limit` bytes.
    pub fn with_output_limit(limit: u64) -> Self {
        Self {
            output_limit: Some(limit),
        }
    }

    /// Decompress every block up to and including the final one.
    pub fn inflate(&mut self, reader: &mut BitReader<'_>) -> Result<Vec<u8>> {
        let mut window = match self.output_limit {
            Some(limit) => OutputWindow::with_limit(limit),
            None => OutputWindow::new(),
        };

        loop {
            let header_position = reader.bit_position();
            let is_final = reader.bits(1)? == 1;
            let block_type = reader.bits(2)?;

            match block_type {
                0 => Self::inflate_stored(reader, &mut window)?,
                1 => Self::inflate_huffman(
                    reader,
                    &mut window,
                    fixed_litlen_tree(),
                    fixed_distance_tree(),
                )?,
                2 => Self::inflate_dynamic(reader, &mut window)?,
                _ => {
                    return Err(OxiBinError::invalid_block_type(
                        block_type,
                        header_position,
                    ));
                }
            }

            if is_final {
                break;
            }
        }

        window.finish()
    }

    /// Decompress a stored (uncompressed) block.
    fn inflate_stored(reader: &mut BitReader<'_>, window: &mut OutputWindow) -> Result<()> {
        reader.align_to_byte();
        let offset = reader.byte_position();

        let len = reader.read_u16_le()?;
        let nlen = reader.read_u16_le()?;
        if len != !nlen {
            return Err(OxiBinError::invalid_block_length(offset, len, nlen));
        }

        window.write_slice(reader.read_bytes(len as usize)?)
    }

    /// Read the code length tables of a dynamic block and decode it.
    fn inflate_dynamic(reader: &mut BitReader<'_>, window: &mut OutputWindow) -> Result<()> {
        let hlit = reader.bits_base(5, 257)? as usize;
        let hdist = reader.bits_base(5, 1)? as usize;
        let hclen = reader.bits_base(4, 4)? as usize;

        if hlit > MAX_LITLEN_CODES || hdist > MAX_DISTANCE_CODES {
            return Err(OxiBinError::corrupted(
                reader.byte_position() as u64,
                format!("Too many length or distance codes: {hlit}/{hdist}"),
            ));
        }

        let mut code_length_lengths = [0u8; 19];
        for &index in &CODE_LENGTH_ORDER[..hclen] {
            code_length_lengths[index] = reader.bits(3)? as u8;
        }
        let code_length_tree = HuffmanTree::from_code_lengths(&code_length_lengths)
            .map_err(|_| OxiBinError::invalid_huffman(reader.bit_position()))?;

        let mut lengths = vec![0u8; hlit + hdist];
        let mut i = 0;
        while i < lengths.len() {
            let symbol = code_length_tree.decode(reader)?;
            let (value, repeat) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(OxiBinError::corrupted(
                            reader.byte_position() as u64,
                            "Repeat code with no previous length",
                        ));
                    }
                    (lengths[i - 1], reader.bits_base(2, 3)? as usize)
                }
                17 => (0, reader.bits_base(3, 3)? as usize),
                _ => (0, reader.bits_base(7, 11)? as usize),
            };

            if i + repeat > lengths.len() {
                return Err(OxiBinError::corrupted(
                    reader.byte_position() as u64,
                    "Code length repeat overflows table",
                ));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(OxiBinError::corrupted(
                reader.byte_position() as u64,
                "Missing end-of-block code",
            ));
        }

        let position = reader.bit_position();
        let litlen_tree = HuffmanTree::from_code_lengths(&lengths[..hlit])
            .map_err(|_| OxiBinError::invalid_huffman(position))?;
        let distance_tree = HuffmanTree::from_code_lengths(&lengths[hlit..])
            .map_err(|_| OxiBinError::invalid_huffman(position))?;

        Self::inflate_huffman(reader, window, &litlen_tree, &distance_tree)
    }

    /// Decode literal/length and distance symbols until end-of-block.
    fn inflate_huffman(
        reader: &mut BitReader<'_>,
        window: &mut OutputWindow,
        litlen_tree: &HuffmanTree,
        distance_tree: &HuffmanTree,
    ) -> Result<()> {
        loop {
            let symbol = litlen_tree.decode(reader)?;
            match symbol {
                0..=255 => window.write_literal(symbol as u8),
                END_OF_BLOCK => return Ok(()),
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    let length = reader.bits_base(
                        LENGTH_EXTRA_BITS[index] as u32,
                        LENGTH_BASE[index] as u32,
                    )?;

                    let distance_symbol = distance_tree.decode(reader)? as usize;
                    if distance_symbol >= DISTANCE_BASE.len() {
                        return Err(OxiBinError::corrupted(
                            reader.byte_position() as u64,
                            format!("Invalid distance symbol: {distance_symbol}"),
                        ));
                    }
                    let distance = reader.bits_base(
                        DISTANCE_EXTRA_BITS[distance_symbol] as u32,
                        DISTANCE_BASE[distance_symbol] as u32,
                    )?;

                    window.copy_match(distance as usize, length as usize)?;
                }
                _ => {
                    return Err(OxiBinError::corrupted(
                        reader.byte_position() as u64,
                        format!("Invalid literal/length symbol: {symbol}"),
                    ));
                }
            }
            window.maybe_flush()?;
        }
    }
}

/// Decompress a raw DEFLATE stream (no zlib or gzip wrapper).
pub fn inflate_raw(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().inflate(&mut BitReader::new(data))
}

/// Decompress a raw DEFLATE stream whose output must not exceed `limit` bytes.
pub fn inflate_raw_with_limit(data: &[u8], limit: u64) -> Result<Vec<u8>> {
    Inflater::with_output_limit(limit).inflate(&mut BitReader::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflate_stored() {
        // BFINAL=1, BTYPE=00, then aligned LEN=5, NLEN=!5, "Hello"
        let compressed = [
            0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o',
        ];
        assert_eq!(inflate_raw(&compressed).unwrap(), b"Hello");
    }

    #[test]
    fn test_inflate_empty_stored() {
        let compressed = [0x01, 0x00, 0x00, 0xFF, 0xFF];
        assert!(inflate_raw(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_stored_length_mismatch() {
        let compressed = [0x01, 0x05, 0x00, 0xFB, 0xFF, b'H', b'e', b'l', b'l', b'o'];
        assert!(matches!(
            inflate_raw(&compressed),
            Err(OxiBinError::InvalidBlockLength {
                offset: 1,
                length: 5,
                inverse: 0xFFFB
            })
        ));
    }

    #[test]
    fn test_fixed_hello_world() {
        let compressed = [
            0xF3, 0x48, 0xCD, 0xC9, 0xC9, 0xD7, 0x51, 0x08, 0xCF, 0x2F, 0xCA, 0x49, 0x51, 0x04,
            0x00,
        ];
        assert_eq!(inflate_raw(&compressed).unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_reserved_block_type() {
        // BFINAL=1, BTYPE=11
        assert!(matches!(
            inflate_raw(&[0x07]),
            Err(OxiBinError::InvalidBlockType {
                block_type: 3,
                bit_position: 0
            })
        ));
    }

    #[test]
    fn test_truncated_input() {
        assert!(inflate_raw(&[]).is_err());
        // Fixed block that never reaches end-of-block.
        assert!(matches!(
            inflate_raw(&[0xF3, 0x48]),
            Err(OxiBinError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_output_limit() {
        let compressed = [
            0xF3, 0x48, 0xCD, 0xC9, 0xC9, 0xD7, 0x51, 0x08, 0xCF, 0x2F, 0xCA, 0x49, 0x51, 0x04,
            0x00,
        ];
        assert!(inflate_raw_with_limit(&compressed, 13).is_ok());
        assert!(matches!(
            inflate_raw_with_limit(&compressed, 5),
            Err(OxiBinError::SizeMismatch { expected: 5, .. })
        ));
    }
}
