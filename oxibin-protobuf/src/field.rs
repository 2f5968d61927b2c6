//! Schema-less field walking.

use crate::reader::Reader;
use crate::wire::{WireTag, WireType};
use oxibin_core::error::{OxiBinError, Result};

/// Undecoded value of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Raw varint bits.
    Varint(u64),
    /// Eight little-endian bytes.
    Fixed64(u64),
    /// Length-delimited payload: a string, bytes, an embedded message or a packed run.
    LengthDelimited(&'a [u8]),
    /// Body of a legacy group, without its start and end keys.
    Group(&'a [u8]),
    /// Four little-endian bytes.
    Fixed32(u32),
}

impl FieldValue<'_> {
    /// Wire type this value was read with.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::LengthDelimited(_) => WireType::LengthDelimited,
            Self::Group(_) => WireType::StartGroup,
            Self::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// One field as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawField<'a> {
    /// Offset of the field key.
    pub offset: usize,
    /// Field key.
    pub tag: WireTag,
    /// Undecoded value.
    pub value: FieldValue<'a>,
}

impl<'a> Reader<'a> {
    /// Read the next key and its value without interpreting either.
    pub fn field(&mut self) -> Result<RawField<'a>> {
        let offset = self.position();
        let tag = self.tag()?;
        let value = match tag.wire_type {
            WireType::Varint => FieldValue::Varint(self.uint64()?),
            WireType::Fixed64 => FieldValue::Fixed64(self.fixed64()?),
            WireType::LengthDelimited => FieldValue::LengthDelimited(self.bytes()?),
            WireType::Fixed32 => FieldValue::Fixed32(self.fixed32()?),
            WireType::StartGroup => {
                let body = self.position();
                let end = self.skip_group()?;
                FieldValue::Group(&self.buffer()[body..end])
            }
            WireType::EndGroup => {
                return Err(OxiBinError::invalid_wire_type(
                    WireType::EndGroup.as_u32(),
                    offset,
                ));
            }
        };
        Ok(RawField { offset, tag, value })
    }

    /// Iterate over the remaining fields.
    ///
    /// The iterator stops after the first error.
    pub fn fields(&mut self) -> Fields<'_, 'a> {
        Fields {
            reader: self,
            failed: false,
        }
    }
}

/// Iterator returned by [`Reader::fields`].
#[derive(Debug)]
pub struct Fields<'r, 'a> {
    reader: &'r mut Reader<'a>,
    failed: bool,
}

impl<'a> Iterator for Fields<'_, 'a> {
    type Item = Result<RawField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_at_end() {
            return None;
        }
        let field = self.reader.field();
        self.failed = field.is_err();
        Some(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_every_wire_type() {
        let data = [
            0x08, 0x96, 0x01, // 1: varint 150
            0x11, 1, 0, 0, 0, 0, 0, 0, 0, // 2: fixed64 1
            0x1A, 0x02, b'h', b'i', // 3: bytes "hi"
            0x23, 0x08, 0x01, 0x24, // 4: group { 1: 1 }
            0x2D, 2, 0, 0, 0, // 5: fixed32 2
        ];
        let mut reader = Reader::new(&data);
        let fields: Vec<_> = reader.fields().collect::<Result<_>>().unwrap();

        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0].value, FieldValue::Varint(150));
        assert_eq!(fields[1].value, FieldValue::Fixed64(1));
        assert_eq!(fields[2].value, FieldValue::LengthDelimited(b"hi"));
        assert_eq!(fields[3].value, FieldValue::Group(&[0x08, 0x01]));
        assert_eq!(fields[3].tag.field_number, 4);
        assert_eq!(fields[4].value, FieldValue::Fixed32(2));
        assert_eq!(fields[4].offset, 20);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let data = [0x08, 0x01, 0x0F, 0x08, 0x02];
        let mut reader = Reader::new(&data);
        let mut fields = reader.fields();
        assert!(fields.next().unwrap().is_ok());
        assert!(fields.next().unwrap().is_err());
        assert!(fields.next().is_none());
    }
}
