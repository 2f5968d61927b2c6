//! Static tables for DEFLATE (RFC 1951).
//!
//! Everything here is immutable. The two fixed Huffman trees are built on
//! first use behind a [`OnceLock`] and shared by every decode afterwards.

use crate::huffman::HuffmanTree;
use std::sync::OnceLock;

/// Base match length for length symbols 257-285 (RFC 1951 Section 3.2.5).
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits following length symbols 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for distance symbols 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits following distance symbols 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length code lengths in a dynamic block header.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Number of literal/length symbols in the fixed code (286 and 287 never occur in valid data).
pub const FIXED_LITLEN_SYMBOLS: usize = 288;

/// Number of distance symbols in the fixed code (30 and 31 never occur in valid data).
pub const FIXED_DISTANCE_SYMBOLS: usize = 32;

/// Bit lengths of the fixed literal/length code (RFC 1951 Section 3.2.6).
pub fn fixed_litlen_lengths() -> [u8; FIXED_LITLEN_SYMBOLS] {
    let mut lengths = [8u8; FIXED_LITLEN_SYMBOLS];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths
}

/// The fixed literal/length tree.
pub fn fixed_litlen_tree() -> &'static HuffmanTree {
    static TREE: OnceLock<HuffmanTree> = OnceLock::new();
    TREE.get_or_init(|| HuffmanTree::from_complete_lengths(&fixed_litlen_lengths()))
}

/// The fixed distance tree: 32 symbols, 5 bits each.
pub fn fixed_distance_tree() -> &'static HuffmanTree {
    static TREE: OnceLock<HuffmanTree> = OnceLock::new();
    TREE.get_or_init(|| HuffmanTree::from_complete_lengths(&[5u8; FIXED_DISTANCE_SYMBOLS]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_table_covers_3_to_258() {
        let last = LENGTH_BASE.len() - 2;
        let max = LENGTH_BASE[last] + (1 << LENGTH_EXTRA_BITS[last]) - 1;
        assert_eq!(LENGTH_BASE[0], 3);
        assert_eq!(max, 258);
        assert_eq!(LENGTH_BASE[28], 258);

        for i in 1..last + 1 {
            assert_eq!(
                LENGTH_BASE[i],
                LENGTH_BASE[i - 1] + (1 << LENGTH_EXTRA_BITS[i - 1])
            );
        }
    }

    #[test]
    fn test_distance_table_covers_32k() {
        for i in 1..DISTANCE_BASE.len() {
            assert_eq!(
                DISTANCE_BASE[i] as u32,
                DISTANCE_BASE[i - 1] as u32 + (1u32 << DISTANCE_EXTRA_BITS[i - 1])
            );
        }
        let max = DISTANCE_BASE[29] as u32 + (1u32 << DISTANCE_EXTRA_BITS[29]) - 1;
        assert_eq!(max, 32768);
    }

    #[test]
    fn test_fixed_trees_are_shared() {
        assert!(std::ptr::eq(fixed_litlen_tree(), fixed_litlen_tree()));
        assert_eq!(fixed_litlen_tree().symbol_count(), 288);
        assert_eq!(fixed_distance_tree().symbol_count(), 32);
    }
}
