//! 64-bit varint values split into two 32-bit halves.

/// A 64-bit value accumulated as low and high 32-bit words.
///
/// The varint decoder fills the low word from the first four and a half
/// groups and the high word from the rest, so the common 32-bit case never
/// touches 64-bit arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LongBits {
    /// Low 32 bits.
    pub lo: u32,
    /// High 32 bits.
    pub hi: u32,
}

impl LongBits {
    /// Zero.
    pub const ZERO: Self = Self { lo: 0, hi: 0 };

    /// Create from low and high words.
    pub const fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    /// Split a `u64`.
    pub const fn from_u64(value: u64) -> Self {
        Self {
            lo: value as u32,
            hi: (value >> 32) as u32,
        }
    }

    /// Reassemble as an unsigned value.
    pub const fn to_u64(self) -> u64 {
        ((self.hi as u64) << 32) | self.lo as u64
    }

    /// Reassemble as a two's complement signed value.
    pub const fn to_i64(self) -> i64 {
        self.to_u64() as i64
    }

    /// Undo zigzag encoding on both halves.
    pub const fn zz_decode(self) -> Self {
        let mask = 0u32.wrapping_sub(self.lo & 1);
        let lo = ((self.lo >> 1) | (self.hi << 31)) ^ mask;
        let hi = (self.hi >> 1) ^ mask;
        Self { lo, hi }
    }
}

impl From<u64> for LongBits {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<LongBits> for u64 {
    fn from(bits: LongBits) -> Self {
        bits.to_u64()
    }
}

impl From<LongBits> for i64 {
    fn from(bits: LongBits) -> Self {
        bits.to_i64()
    }
}
