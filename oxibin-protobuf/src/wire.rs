//! Wire types and field tags.

use oxibin_core::error::OxiBinError;
use std::fmt;

/// Encoding shape of a field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// int32, int64, uint32, uint64, sint32, sint64, bool, enum.
    Varint = 0,
    /// fixed64, sfixed64, double.
    Fixed64 = 1,
    /// string, bytes, embedded messages, packed repeated fields.
    LengthDelimited = 2,
    /// Legacy group start.
    StartGroup = 3,
    /// Legacy group end.
    EndGroup = 4,
    /// fixed32, sfixed32, float.
    Fixed32 = 5,
}

impl WireType {
    /// Numeric value as it appears in the low three bits of a tag.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Short name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "bytes",
            Self::StartGroup => "group",
            Self::EndGroup => "end-group",
            Self::Fixed32 => "fixed32",
        }
    }
}

impl TryFrom<u32> for WireType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::Fixed32),
            other => Err(other),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded field key: `(field_number << 3) | wire_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireTag {
    /// Field number.
    pub field_number: u32,
    /// Wire type.
    pub wire_type: WireType,
}

impl WireTag {
    /// Split a raw key. Wire types 6 and 7 fail with `InvalidWireType`.
    pub fn from_raw(raw: u32, offset: usize) -> Result<Self, OxiBinError> {
        let wire_type = WireType::try_from(raw & 7)
            .map_err(|wire_type| OxiBinError::invalid_wire_type(wire_type, offset))?;
        Ok(Self {
            field_number: raw >> 3,
            wire_type,
        })
    }

    /// Re-encode as a raw key.
    pub fn to_raw(self) -> u32 {
        (self.field_number << 3) | self.wire_type.as_u32()
    }
}
