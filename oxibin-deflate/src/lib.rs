//! # OxiBin Deflate
//!
//! Pure Rust DEFLATE decompressor (RFC 1951).
//!
//! The ZIP reader runs method-8 entries through this crate, and it can be
//! used directly on any raw DEFLATE stream held in memory.
//!
//! ## Features
//!
//! - All three block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - Canonical Huffman decoding with count-subtraction lookup
//! - 64 KB output window keeping the 32 KB history DEFLATE requires
//! - Optional output limit, so a lying size field fails early
//!
//! ## Example
//!
//! ```rust
//! use oxibin_deflate::inflate_raw;
//!
//! let compressed = [
//!     0xF3, 0x48, 0xCD, 0xC9, 0xC9, 0xD7, 0x51, 0x08, 0xCF, 0x2F, 0xCA, 0x49, 0x51, 0x04, 0x00,
//! ];
//! assert_eq!(inflate_raw(&compressed).unwrap(), b"Hello, World!");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod huffman;
pub mod inflate;
pub mod tables;
pub mod window;

// Re-exports
pub use huffman::HuffmanTree;
pub use inflate::{Inflater, inflate_raw, inflate_raw_with_limit};
pub use tables::{fixed_distance_tree, fixed_litlen_tree};
pub use window::OutputWindow;
