//! # OxiBin Protocol Buffers
//!
//! Schema-less readers for the two Protocol Buffers encodings:
//!
//! - [`Reader`]: the binary wire format (varints, zigzag, fixed-width
//!   values, length-delimited payloads, packed arrays, map entries, legacy
//!   groups)
//! - [`TextReader`]: the text format (`name: value`, nested `{ ... }`
//!   messages, `[ ... ]` lists, expanded `Any`)
//!
//! Both borrow the input. Decoding a model graph, for instance, never copies
//! tensor payloads: [`Reader::bytes`] returns a slice of the original buffer.
//!
//! ## Example
//!
//! ```rust
//! use oxibin_protobuf::{Reader, TextReader, WireType};
//!
//! let mut reader = Reader::new(&[0x08, 0xAC, 0x02]);
//! let tag = reader.tag().unwrap();
//! assert_eq!((tag.field_number, tag.wire_type), (1, WireType::Varint));
//! assert_eq!(reader.uint32().unwrap(), 300);
//!
//! let mut text = TextReader::new("x: nan");
//! assert_eq!(text.tag().unwrap(), "x");
//! assert!(text.float().unwrap().is_nan());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod field;
pub mod long_bits;
pub mod options;
pub mod reader;
pub mod text;
pub mod wire;

pub use field::{FieldValue, Fields, RawField};
pub use long_bits::LongBits;
pub use options::DecodeLimits;
pub use reader::Reader;
pub use text::{AnyValue, Location, TextReader};
pub use wire::{WireTag, WireType};

pub use oxibin_core::{OxiBinError, Result};
