//! Protocol Buffers binary wire format reader.
//!
//! [`Reader`] is schema-less: it decodes whatever primitive the caller asks
//! for at the current position. Generated or hand-written message decoders
//! drive it with a loop over [`Reader::tag`]:
//!
//! ```rust
//! use oxibin_protobuf::{Reader, WireType};
//!
//! // field 1 (varint) = 150, field 2 (bytes) = "hi"
//! let data = [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i'];
//! let mut reader = Reader::new(&data);
//!
//! let mut id = 0;
//! let mut name = String::new();
//! while !reader.is_at_end() {
//!     let tag = reader.tag().unwrap();
//!     match tag.field_number {
//!         1 => id = reader.uint32().unwrap(),
//!         2 => name = reader.string().unwrap().into_owned(),
//!         _ => reader.skip_type(tag.wire_type).unwrap(),
//!     }
//! }
//! assert_eq!((id, name.as_str()), (150, "hi"));
//! ```
//!
//! `bytes()` and `string()` borrow from the input buffer. Only the packed
//! array helpers and `string()` on invalid UTF-8 allocate.

use crate::long_bits::LongBits;
use crate::options::DecodeLimits;
use crate::wire::{WireTag, WireType};
use oxibin_core::ByteCursor;
use oxibin_core::error::{OxiBinError, Result};
use std::borrow::Cow;

/// Longest varint on the wire.
pub const MAX_VARINT_LEN: usize = 10;

/// Cursor over a binary-encoded message.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    cursor: ByteCursor<'a>,
    limits: DecodeLimits,
}

impl<'a> Reader<'a> {
    /// Create a reader with default limits.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, DecodeLimits::default())
    }

    /// Create a reader with explicit limits.
    pub fn with_limits(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            limits,
        }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Whether every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Whether the position is still before `end`.
    ///
    /// Pairs with [`delimited_end`](Self::delimited_end) to walk an embedded
    /// message in place.
    pub fn is_before(&self, end: usize) -> bool {
        self.cursor.position() < end
    }

    /// The whole underlying buffer.
    pub fn buffer(&self) -> &'a [u8] {
        self.cursor.get_ref()
    }

    /// Limits in effect.
    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Read a field key.
    pub fn tag(&mut self) -> Result<WireTag> {
        let offset = self.cursor.position();
        let raw = self.uint32()?;
        WireTag::from_raw(raw, offset)
    }

    /// Read a varint as an unsigned 32-bit value.
    ///
    /// Bits above 32 are discarded, but the varint must still end within
    /// ten bytes.
    pub fn uint32(&mut self) -> Result<u32> {
        let start = self.cursor.position();
        let mut value = 0u32;

        for shift in [0, 7, 14, 21] {
            let byte = self.cursor.read_u8()?;
            value |= u32::from(byte & 0x7F) << shift;
            if byte < 0x80 {
                return Ok(value);
            }
        }

        let byte = self.cursor.read_u8()?;
        value |= u32::from(byte & 0x0F) << 28;
        if byte < 0x80 {
            return Ok(value);
        }

        for _ in 0..5 {
            if self.cursor.read_u8()? < 0x80 {
                return Ok(value);
            }
        }
        Err(OxiBinError::invalid_varint(start))
    }

    /// Read a varint as a signed 32-bit value.
    pub fn int32(&mut self) -> Result<i32> {
        Ok(self.uint32()? as i32)
    }

    /// Read a zigzag-encoded signed 32-bit value.
    pub fn sint32(&mut self) -> Result<i32> {
        let value = self.uint32()?;
        Ok(((value >> 1) as i32) ^ -((value & 1) as i32))
    }

    /// Read a full 64-bit varint.
    pub fn varint64(&mut self) -> Result<LongBits> {
        let start = self.cursor.position();
        let mut bits = LongBits::ZERO;

        for shift in [0, 7, 14, 21] {
            let byte = self.cursor.read_u8()?;
            bits.lo |= u32::from(byte & 0x7F) << shift;
            if byte < 0x80 {
                return Ok(bits);
            }
        }

        // The fifth group straddles both words.
        let byte = self.cursor.read_u8()?;
        bits.lo |= u32::from(byte & 0x0F) << 28;
        bits.hi = u32::from(byte & 0x7F) >> 4;
        if byte < 0x80 {
            return Ok(bits);
        }

        for shift in [3, 10, 17, 24, 31] {
            let byte = self.cursor.read_u8()?;
            bits.hi |= u32::from(byte & 0x7F) << shift;
            if byte < 0x80 {
                return Ok(bits);
            }
        }
        Err(OxiBinError::invalid_varint(start))
    }

    /// Read a varint as a signed 64-bit value.
    pub fn int64(&mut self) -> Result<i64> {
        Ok(self.varint64()?.to_i64())
    }

    /// Read a varint as an unsigned 64-bit value.
    pub fn uint64(&mut self) -> Result<u64> {
        Ok(self.varint64()?.to_u64())
    }

    /// Read a zigzag-encoded signed 64-bit value.
    pub fn sint64(&mut self) -> Result<i64> {
        Ok(self.varint64()?.zz_decode().to_i64())
    }

    /// Read a boolean varint.
    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.uint32()? != 0)
    }

    /// Read a little-endian `fixed32`.
    pub fn fixed32(&mut self) -> Result<u32> {
        self.cursor.read_u32_le()
    }

    /// Read a little-endian `sfixed32`.
    pub fn sfixed32(&mut self) -> Result<i32> {
        Ok(self.cursor.read_u32_le()? as i32)
    }

    /// Read a little-endian `fixed64`.
    pub fn fixed64(&mut self) -> Result<u64> {
        self.cursor.read_u64_le()
    }

    /// Read a little-endian `sfixed64`.
    pub fn sfixed64(&mut self) -> Result<i64> {
        Ok(self.cursor.read_u64_le()? as i64)
    }

    /// Read a little-endian IEEE 754 single.
    pub fn float(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.cursor.read_array()?))
    }

    /// Read a little-endian IEEE 754 double.
    pub fn double(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.cursor.read_array()?))
    }

    /// Read a length-prefixed byte string as a view of the input.
    pub fn bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.uint32()? as usize;
        self.cursor.read(length)
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// Borrowed when the bytes are valid UTF-8; invalid sequences are
    /// replaced with U+FFFD rather than failing.
    pub fn string(&mut self) -> Result<Cow<'a, str>> {
        Ok(String::from_utf8_lossy(self.bytes()?))
    }

    /// Read a length prefix and return the offset where that payload ends.
    pub fn delimited_end(&mut self) -> Result<usize> {
        let length = self.uint32()? as usize;
        self.cursor.ensure(length)?;
        Ok(self.cursor.position() + length)
    }

    /// Read an embedded message and return a reader over it.
    ///
    /// The new reader shares this reader's limits.
    pub fn message(&mut self) -> Result<Reader<'a>> {
        Ok(Reader::with_limits(self.bytes()?, self.limits))
    }

    /// Advance `length` bytes.
    pub fn skip(&mut self, length: usize) -> Result<()> {
        self.cursor.skip(length)
    }

    /// Advance past one varint.
    pub fn skip_varint(&mut self) -> Result<()> {
        let start = self.cursor.position();
        for _ in 0..MAX_VARINT_LEN {
            if self.cursor.read_u8()? < 0x80 {
                return Ok(());
            }
        }
        Err(OxiBinError::invalid_varint(start))
    }

    /// Advance past the value of a field whose key has already been read.
    ///
    /// Legacy groups are skipped up to and including their end-group key.
    /// A stray end-group key fails with `InvalidWireType`.
    pub fn skip_type(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::StartGroup => self.skip_group().map(|_| ()),
            other => self.skip_scalar(other),
        }
    }

    fn skip_scalar(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.skip_varint(),
            WireType::Fixed64 => self.skip(8),
            WireType::LengthDelimited => {
                let length = self.uint32()? as usize;
                self.skip(length)
            }
            WireType::Fixed32 => self.skip(4),
            WireType::StartGroup | WireType::EndGroup => Err(OxiBinError::invalid_wire_type(
                wire_type.as_u32(),
                self.cursor.position(),
            )),
        }
    }

    /// Skip the body of a group whose start key has been read.
    ///
    /// Nested groups are tracked with a counter, not recursion. Returns the
    /// offset of the closing end-group key.
    pub(crate) fn skip_group(&mut self) -> Result<usize> {
        let mut depth = 1usize;
        loop {
            let offset = self.cursor.position();
            let tag = self.tag()?;
            match tag.wire_type {
                WireType::StartGroup => {
                    depth += 1;
                    if depth > self.limits.max_group_depth {
                        return Err(OxiBinError::limit_exceeded(
                            "group depth",
                            self.limits.max_group_depth,
                            offset,
                        ));
                    }
                }
                WireType::EndGroup => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(offset);
                    }
                }
                other => self.skip_scalar(other)?,
            }
        }
    }

    /// Decode one or more elements of a repeated scalar field into `out`.
    ///
    /// A length-delimited field is a packed run and `item` is called until
    /// the payload is exhausted. Any other wire type is a single element.
    pub fn array<T>(
        &mut self,
        wire_type: WireType,
        out: &mut Vec<T>,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<()> {
        if wire_type != WireType::LengthDelimited {
            self.check_repeated(out.len())?;
            out.push(item(self)?);
            return Ok(());
        }

        let offset = self.cursor.position();
        let end = self.delimited_end()?;
        while self.is_before(end) {
            self.check_repeated(out.len())?;
            out.push(item(self)?);
        }
        if self.cursor.position() != end {
            return Err(OxiBinError::invalid_packed_array(
                offset,
                "last element overruns the packed payload",
            ));
        }
        Ok(())
    }

    /// Decode a repeated `float` field, packed or not.
    pub fn floats(&mut self, wire_type: WireType, out: &mut Vec<f32>) -> Result<()> {
        self.fixed_array(wire_type, WireType::Fixed32, out, f32::from_le_bytes)
    }

    /// Decode a repeated `double` field, packed or not.
    pub fn doubles(&mut self, wire_type: WireType, out: &mut Vec<f64>) -> Result<()> {
        self.fixed_array(wire_type, WireType::Fixed64, out, f64::from_le_bytes)
    }

    /// Packed payloads are decoded in one pass into a buffer sized up front.
    /// Non-packed elements are appended one at a time, subject to the
    /// repeated element limit.
    fn fixed_array<T, const N: usize>(
        &mut self,
        wire_type: WireType,
        element_type: WireType,
        out: &mut Vec<T>,
        decode: fn([u8; N]) -> T,
    ) -> Result<()> {
        let offset = self.cursor.position();

        if wire_type == element_type {
            self.check_repeated(out.len())?;
            out.push(decode(self.cursor.read_array()?));
            return Ok(());
        }
        if wire_type != WireType::LengthDelimited {
            return Err(OxiBinError::invalid_wire_type(wire_type.as_u32(), offset));
        }

        if !out.is_empty() {
            return Err(OxiBinError::invalid_packed_array(
                offset,
                "packed payload follows non-packed elements",
            ));
        }
        let payload = self.bytes()?;
        if payload.len() % N != 0 {
            return Err(OxiBinError::invalid_packed_array(
                offset,
                format!("{} bytes is not a multiple of {N}", payload.len()),
            ));
        }

        out.reserve_exact(payload.len() / N);
        out.extend(payload.chunks_exact(N).map(|chunk| {
            let mut bytes = [0u8; N];
            bytes.copy_from_slice(chunk);
            decode(bytes)
        }));
        Ok(())
    }

    /// Decode one map entry and append it to `map`.
    ///
    /// The entry is a nested message with the key in field 1 and the value
    /// in field 2; other fields are skipped. A missing key or value takes
    /// its type's default.
    pub fn entry<K, V>(
        &mut self,
        map: &mut impl Extend<(K, V)>,
        mut key: impl FnMut(&mut Self) -> Result<K>,
        mut value: impl FnMut(&mut Self) -> Result<V>,
    ) -> Result<()>
    where
        K: Default,
        V: Default,
    {
        let offset = self.cursor.position();
        let end = self.delimited_end()?;
        let mut entry_key = None;
        let mut entry_value = None;

        while self.is_before(end) {
            let tag = self.tag()?;
            match tag.field_number {
                1 => entry_key = Some(key(self)?),
                2 => entry_value = Some(value(self)?),
                _ => self.skip_type(tag.wire_type)?,
            }
        }
        if self.cursor.position() != end {
            return Err(OxiBinError::corrupted(
                offset as u64,
                "map entry overruns its length",
            ));
        }

        map.extend(std::iter::once((
            entry_key.unwrap_or_default(),
            entry_value.unwrap_or_default(),
        )));
        Ok(())
    }

    fn check_repeated(&self, count: usize) -> Result<()> {
        if count >= self.limits.max_repeated_elements {
            return Err(OxiBinError::limit_exceeded(
                "repeated elements",
                self.limits.max_repeated_elements,
                self.cursor.position(),
            ));
        }
        Ok(())
    }
}
