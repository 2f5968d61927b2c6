//! Error types for OxiBin operations.
//!
//! Every decoder in the workspace reports failures through [`OxiBinError`].
//! Errors are terminal for the decode call that produced them: nothing in the
//! core retries or substitutes a default value. Each variant carries enough
//! context (a byte offset, a bit position, or a line/column pair) for the
//! caller to point at the offending input.

use thiserror::Error;

/// The main error type for OxiBin operations.
#[derive(Debug, Error)]
pub enum OxiBinError {
    /// A read would run past the end of the buffer.
    #[error("Index out of range: {position} + {requested} > {length}")]
    OutOfRange {
        /// Cursor position at the time of the read.
        position: usize,
        /// Number of bytes requested.
        requested: usize,
        /// Total buffer length.
        length: usize,
    },

    /// The bit stream ended before a complete code could be read.
    #[error("Unexpected end of bit stream at bit {bit_position}")]
    UnexpectedEof {
        /// Bit position where input ran out.
        bit_position: u64,
    },

    /// Protocol Buffers wire type 6, 7, or an unmatched end-group.
    #[error("Invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType {
        /// The offending wire type.
        wire_type: u32,
        /// Byte offset of the field.
        offset: usize,
    },

    /// A varint did not terminate within ten bytes.
    #[error("Invalid varint encoding at offset {offset}")]
    InvalidVarint {
        /// Byte offset where the varint started.
        offset: usize,
    },

    /// Packed and non-packed encodings were mixed, or a packed payload is misaligned.
    #[error("Invalid packed array at offset {offset}: {message}")]
    InvalidPackedArray {
        /// Byte offset of the packed payload.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// Syntax error in Protocol Buffers text format.
    #[error("{message} at {line}:{column}")]
    TextSyntax {
        /// Description of the problem.
        message: String,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
    },

    /// Invalid magic number or record signature.
    #[error("Invalid magic number at offset {offset}: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Byte offset of the signature.
        offset: usize,
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// No End-Of-Central-Directory record in the buffer.
    #[error("End of central directory not found")]
    EocdNotFound,

    /// The central directory offset overflowed 32 bits but no ZIP64 record exists.
    #[error("Zip64 end of central directory not found")]
    Zip64LocatorNotFound,

    /// A ZIP64 value does not fit in 32 bits.
    #[error("Zip 64-bit {field} not supported")]
    Zip64Unsupported {
        /// Which field was too wide.
        field: &'static str,
    },

    /// Encrypted ZIP entries are not supported.
    #[error("Encrypted entry not supported: {name}")]
    EncryptedEntry {
        /// Entry name from the central directory.
        name: String,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: u16,
    },

    /// A central directory record points at something that is not a local header.
    #[error("Invalid local file header signature at offset {offset}")]
    InvalidLocalHeader {
        /// Claimed local header offset.
        offset: u64,
    },

    /// Declared and actual sizes disagree.
    #[error("Size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        /// Declared size.
        expected: u64,
        /// Actual size.
        actual: u64,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from archive.
        expected: u32,
        /// Computed CRC value from data.
        computed: u32,
    },

    /// Reserved DEFLATE block type.
    #[error("Invalid block type {block_type} at bit {bit_position}")]
    InvalidBlockType {
        /// The block type bits.
        block_type: u32,
        /// Bit position of the block header.
        bit_position: u64,
    },

    /// Stored block whose LEN and NLEN fields disagree.
    #[error("Invalid stored block length at offset {offset}: {length} vs !{inverse}")]
    InvalidBlockLength {
        /// Byte offset of the LEN field.
        offset: usize,
        /// LEN field.
        length: u16,
        /// NLEN field.
        inverse: u16,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Invalid distance in LZ77 back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Current history size.
        history_size: usize,
    },

    /// Corrupted data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A configured decode limit was exceeded.
    #[error("Limit exceeded at offset {offset}: {what} (limit {limit})")]
    LimitExceeded {
        /// Name of the limit.
        what: &'static str,
        /// Configured limit.
        limit: usize,
        /// Byte offset where the limit was hit.
        offset: usize,
    },
}

/// Result type alias for OxiBin operations.
pub type Result<T> = std::result::Result<T, OxiBinError>;

impl OxiBinError {
    /// Create an out-of-range error.
    pub fn out_of_range(position: usize, requested: usize, length: usize) -> Self {
        Self::OutOfRange {
            position,
            requested,
            length,
        }
    }

    /// Create an unexpected end-of-stream error.
    pub fn unexpected_eof(bit_position: u64) -> Self {
        Self::UnexpectedEof { bit_position }
    }

    /// Create an invalid wire type error.
    pub fn invalid_wire_type(wire_type: u32, offset: usize) -> Self {
        Self::InvalidWireType { wire_type, offset }
    }

    /// Create an invalid varint error.
    pub fn invalid_varint(offset: usize) -> Self {
        Self::InvalidVarint { offset }
    }

    /// Create an invalid packed array error.
    pub fn invalid_packed_array(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidPackedArray {
            offset,
            message: message.into(),
        }
    }

    /// Create a text format syntax error.
    pub fn text_syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::TextSyntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(
        offset: usize,
        expected: impl Into<Vec<u8>>,
        found: impl Into<Vec<u8>>,
    ) -> Self {
        Self::InvalidMagic {
            offset,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported ZIP64 field error.
    pub fn zip64_unsupported(field: &'static str) -> Self {
        Self::Zip64Unsupported { field }
    }

    /// Create an encrypted entry error.
    pub fn encrypted_entry(name: impl Into<String>) -> Self {
        Self::EncryptedEntry { name: name.into() }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: u16) -> Self {
        Self::UnsupportedMethod { method }
    }

    /// Create an invalid local header error.
    pub fn invalid_local_header(offset: u64) -> Self {
        Self::InvalidLocalHeader { offset }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u64, actual: u64) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an invalid block type error.
    pub fn invalid_block_type(block_type: u32, bit_position: u64) -> Self {
        Self::InvalidBlockType {
            block_type,
            bit_position,
        }
    }

    /// Create an invalid stored block length error.
    pub fn invalid_block_length(offset: usize, length: u16, inverse: u16) -> Self {
        Self::InvalidBlockLength {
            offset,
            length,
            inverse,
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create a limit exceeded error.
    pub fn limit_exceeded(what: &'static str, limit: usize, offset: usize) -> Self {
        Self::LimitExceeded {
            what,
            limit,
            offset,
        }
    }

    /// Byte offset associated with this error, when one is known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::OutOfRange { position, .. } => Some(*position as u64),
            Self::UnexpectedEof { bit_position }
            | Self::InvalidBlockType { bit_position, .. }
            | Self::InvalidHuffmanCode { bit_position } => Some(bit_position / 8),
            Self::InvalidWireType { offset, .. }
            | Self::InvalidVarint { offset }
            | Self::InvalidPackedArray { offset, .. }
            | Self::InvalidMagic { offset, .. }
            | Self::InvalidBlockLength { offset, .. }
            | Self::LimitExceeded { offset, .. } => Some(*offset as u64),
            Self::InvalidLocalHeader { offset } | Self::CorruptedData { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiBinError::out_of_range(10, 4, 12);
        assert_eq!(err.to_string(), "Index out of range: 10 + 4 > 12");

        let err = OxiBinError::text_syntax("Unexpected token '}'", 3, 7);
        assert_eq!(err.to_string(), "Unexpected token '}' at 3:7");

        let err = OxiBinError::invalid_magic(0, b"PK".to_vec(), vec![0x1F, 0x8B]);
        assert!(err.to_string().contains("Invalid magic"));

        let err = OxiBinError::unsupported_method(12);
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_error_offset() {
        assert_eq!(OxiBinError::invalid_varint(42).offset(), Some(42));
        assert_eq!(OxiBinError::invalid_huffman(80).offset(), Some(10));
        assert_eq!(OxiBinError::invalid_local_header(7).offset(), Some(7));
        assert_eq!(OxiBinError::EocdNotFound.offset(), None);
    }
}
