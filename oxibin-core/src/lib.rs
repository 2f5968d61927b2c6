//! # OxiBin Core
//!
//! Core components for the OxiBin binary deserialization toolkit.
//!
//! This crate provides the building blocks every decoder in the workspace
//! sits on:
//!
//! - [`cursor`]: Bounds-checked forward cursor over a resident byte buffer
//! - [`bitstream`]: LSB-first bit reader for DEFLATE
//! - [`crc`]: CRC-32 checksum
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiBin is a layered stack. Nothing in it performs I/O: every layer works
//! on a buffer the caller has already loaded.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: Front end                                           │
//! │     oxibin CLI                                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container / Wire                                    │
//! │     ZIP archive reader, Protocol Buffers readers        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE (canonical Huffman + LZ77 window)           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     ByteCursor, BitReader, CRC-32, errors               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxibin_core::{BitReader, ByteCursor, Crc32};
//!
//! let data = [0x2A, 0x00, 0x00, 0x00];
//! let mut cursor = ByteCursor::new(&data);
//! assert_eq!(cursor.read_u32_le().unwrap(), 42);
//!
//! let mut bits = BitReader::new(&data);
//! assert_eq!(bits.bits(6).unwrap(), 42);
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod cursor;
pub mod error;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use crc::Crc32;
pub use cursor::ByteCursor;
pub use error::{OxiBinError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitReader;
    pub use crate::crc::Crc32;
    pub use crate::cursor::ByteCursor;
    pub use crate::error::{OxiBinError, Result};
}
