//! ZIP header structures.
//!
//! Every record here is parsed straight out of the archive buffer. Names,
//! extra fields and comments are borrowed, never copied.

use oxibin_core::ByteCursor;
use oxibin_core::error::{OxiBinError, Result};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: [u8; 4] = *b"PK\x03\x04";

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: [u8; 4] = *b"PK\x01\x02";

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: [u8; 4] = *b"PK\x05\x06";

/// ZIP64 end of central directory signature.
pub const ZIP64_END_OF_CENTRAL_DIR_SIG: [u8; 4] = *b"PK\x06\x06";

/// ZIP64 extra field header ID.
pub const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;

/// Marker value for Zip64 (0xFFFFFFFF for 32-bit fields).
pub const ZIP64_MARKER_32: u32 = 0xFFFF_FFFF;

/// Marker value for Zip64 (0xFFFF for 16-bit fields).
pub const ZIP64_MARKER_16: u16 = 0xFFFF;

/// General purpose flag bit for encrypted entries.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Size of the local file header after its signature.
const LOCAL_HEADER_FIXED_LEN: usize = 26;

/// Offset of the central directory offset inside a ZIP64 EOCD record,
/// counted from the end of its signature.
const ZIP64_CD_OFFSET_POSITION: usize = 44;

/// ZIP compression methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Stored (no compression).
    Stored,
    /// Deflate compression.
    Deflate,
    /// Any other method; reading its data fails.
    Unknown(u16),
}

impl CompressionMethod {
    /// Create from the on-disk method number.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Stored,
            8 => Self::Deflate,
            _ => Self::Unknown(value),
        }
    }

    /// The on-disk method number.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflate => 8,
            Self::Unknown(value) => value,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => write!(f, "Stored"),
            Self::Deflate => write!(f, "Deflate"),
            Self::Unknown(value) => write!(f, "Method {value}"),
        }
    }
}

/// Find the last occurrence of a 4-byte signature.
fn rfind_signature(data: &[u8], signature: [u8; 4]) -> Option<usize> {
    data.windows(4).rposition(|window| window == signature)
}

/// End of central directory record, with any ZIP64 offset already resolved.
#[derive(Debug, Clone)]
pub struct EndOfCentralDirectory<'a> {
    /// Position of the EOCD signature in the buffer.
    pub position: usize,
    /// Entry count declared by the EOCD.
    pub total_entries: u16,
    /// Central directory size declared by the EOCD.
    pub central_directory_size: u32,
    /// Resolved central directory offset.
    pub central_directory_offset: u64,
    /// Whether the offset came from a ZIP64 record.
    pub zip64: bool,
    /// Archive comment.
    pub comment: &'a [u8],
}

impl<'a> EndOfCentralDirectory<'a> {
    /// Scan backward for the EOCD record and resolve the central directory offset.
    ///
    /// The scan is linear because an archive comment of any length may
    /// follow the record. An offset that does not fit the buffer (the
    /// 0xFFFFFFFF sentinel included) sends the reader to the ZIP64 EOCD
    /// record instead.
    pub fn locate(data: &'a [u8]) -> Result<Self> {
        let position =
            rfind_signature(data, END_OF_CENTRAL_DIR_SIG).ok_or(OxiBinError::EocdNotFound)?;

        let mut cursor = ByteCursor::new(data);
        cursor.seek(position + 4)?;
        cursor.skip(6)?; // disk numbers, entries on this disk
        let total_entries = cursor.read_u16_le()?;
        let central_directory_size = cursor.read_u32_le()?;
        let offset32 = cursor.read_u32_le()?;
        let comment_len = cursor.read_u16_le().unwrap_or(0) as usize;
        let comment = cursor.read(comment_len.min(cursor.remaining()))?;

        let mut central_directory_offset = offset32 as u64;
        let mut zip64 = false;
        if offset32 == ZIP64_MARKER_32 || central_directory_offset > data.len() as u64 {
            let record = rfind_signature(&data[..position], ZIP64_END_OF_CENTRAL_DIR_SIG)
                .ok_or(OxiBinError::Zip64LocatorNotFound)?;
            cursor.seek(record + 4 + ZIP64_CD_OFFSET_POSITION)?;
            let wide = cursor.read_u64_le()?;
            if wide >> 32 != 0 {
                return Err(OxiBinError::zip64_unsupported("central directory offset"));
            }
            central_directory_offset = wide;
            zip64 = true;
        }

        if central_directory_offset > data.len() as u64 {
            return Err(OxiBinError::corrupted(
                central_directory_offset,
                "Invalid central directory offset",
            ));
        }

        Ok(Self {
            position,
            total_entries,
            central_directory_size,
            central_directory_offset,
            zip64,
            comment,
        })
    }
}

/// One central directory record.
#[derive(Debug, Clone)]
pub struct CentralDirectoryRecord<'a> {
    /// Version made by (upper byte is the host system).
    pub version_made_by: u16,
    /// General purpose flags.
    pub flags: u16,
    /// Compression method.
    pub method: CompressionMethod,
    /// DOS modification time.
    pub mtime: u16,
    /// DOS modification date.
    pub mdate: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Compressed size, ZIP64 value applied.
    pub compressed_size: u64,
    /// Uncompressed size, ZIP64 value applied.
    pub uncompressed_size: u64,
    /// Disk number start, ZIP64 value applied.
    pub disk_start: u32,
    /// External file attributes.
    pub external_attributes: u32,
    /// Local header offset, ZIP64 value applied.
    pub local_header_offset: u64,
    /// Raw name bytes.
    pub name: &'a [u8],
    /// Raw extra field.
    pub extra: &'a [u8],
    /// Raw entry comment.
    pub comment: &'a [u8],
}

impl<'a> CentralDirectoryRecord<'a> {
    /// Parse a record. The cursor must sit just past the `PK\x01\x02` signature.
    pub fn read(cursor: &mut ByteCursor<'a>) -> Result<Self> {
        let version_made_by = cursor.read_u16_le()?;
        cursor.skip(2)?; // version needed to extract
        let flags = cursor.read_u16_le()?;
        let method = CompressionMethod::from_u16(cursor.read_u16_le()?);
        let mtime = cursor.read_u16_le()?;
        let mdate = cursor.read_u16_le()?;
        let crc32 = cursor.read_u32_le()?;
        let compressed_size = cursor.read_u32_le()?;
        let uncompressed_size = cursor.read_u32_le()?;
        let name_len = cursor.read_u16_le()? as usize;
        let extra_len = cursor.read_u16_le()? as usize;
        let comment_len = cursor.read_u16_le()? as usize;
        let disk_start = cursor.read_u16_le()?;
        cursor.skip(2)?; // internal attributes
        let external_attributes = cursor.read_u32_le()?;
        let local_header_offset = cursor.read_u32_le()?;

        let name = cursor.read(name_len)?;
        let extra = cursor.read(extra_len)?;
        let comment = cursor.read(comment_len)?;

        if flags & FLAG_ENCRYPTED != 0 {
            return Err(OxiBinError::encrypted_entry(
                encoding_rs::mem::decode_latin1(name).into_owned(),
            ));
        }

        let mut record = Self {
            version_made_by,
            flags,
            method,
            mtime,
            mdate,
            crc32,
            compressed_size: compressed_size as u64,
            uncompressed_size: uncompressed_size as u64,
            disk_start: disk_start as u32,
            external_attributes,
            local_header_offset: local_header_offset as u64,
            name,
            extra,
            comment,
        };
        record.apply_zip64_extra(
            uncompressed_size,
            compressed_size,
            local_header_offset,
            disk_start,
        )?;
        Ok(record)
    }

    /// Replace sentinel fields with their values from the ZIP64 extra field.
    ///
    /// Values appear in the fixed order uncompressed size, compressed size,
    /// local header offset, disk start, and only for fields whose 32-bit
    /// (or 16-bit) slot holds the sentinel.
    fn apply_zip64_extra(
        &mut self,
        uncompressed_size: u32,
        compressed_size: u32,
        local_header_offset: u32,
        disk_start: u16,
    ) -> Result<()> {
        let mut cursor = ByteCursor::new(self.extra);
        while cursor.remaining() >= 4 {
            let id = cursor.read_u16_le()?;
            let size = cursor.read_u16_le()? as usize;
            let mut field = cursor.sub_cursor(size.min(cursor.remaining()))?;
            if id != ZIP64_EXTRA_FIELD_ID {
                continue;
            }

            if uncompressed_size == ZIP64_MARKER_32 {
                self.uncompressed_size = field.read_u64_le()?;
            }
            if compressed_size == ZIP64_MARKER_32 {
                self.compressed_size = field.read_u64_le()?;
            }
            if local_header_offset == ZIP64_MARKER_32 {
                self.local_header_offset = field.read_u64_le()?;
            }
            if disk_start == ZIP64_MARKER_16 {
                self.disk_start = field.read_u32_le()?;
            }
        }
        Ok(())
    }
}

/// The parts of a local file header the reader relies on.
#[derive(Debug, Clone)]
pub struct LocalFileHeader<'a> {
    /// Name bytes as written in the local header.
    pub name: &'a [u8],
    /// Offset of the entry payload.
    pub data_offset: usize,
}

impl<'a> LocalFileHeader<'a> {
    /// Verify the signature at `offset` and locate the payload after it.
    pub fn read(data: &'a [u8], offset: u64) -> Result<Self> {
        let bad_header = || OxiBinError::invalid_local_header(offset);

        let start = usize::try_from(offset).map_err(|_| bad_header())?;
        let mut cursor = ByteCursor::new(data);
        cursor.seek(start).map_err(|_| bad_header())?;
        if cursor.read(4).map_err(|_| bad_header())? != LOCAL_FILE_HEADER_SIG {
            return Err(bad_header());
        }

        let fixed = cursor.read(LOCAL_HEADER_FIXED_LEN)?;
        let name_len = u16::from_le_bytes([fixed[22], fixed[23]]) as usize;
        let extra_len = u16::from_le_bytes([fixed[24], fixed[25]]) as usize;
        let name = cursor.read(name_len)?;
        cursor.skip(extra_len)?;

        Ok(Self {
            name,
            data_offset: cursor.position(),
        })
    }
}

/// A decoded MS-DOS date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    /// Year (1980-2107).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (even, 0-58).
    pub second: u8,
}

impl DosDateTime {
    /// Decode the packed date and time words.
    pub fn from_dos(date: u16, time: u16) -> Self {
        Self {
            year: 1980 + (date >> 9),
            month: ((date >> 5) & 0x0F) as u8,
            day: (date & 0x1F) as u8,
            hour: (time >> 11) as u8,
            minute: ((time >> 5) & 0x3F) as u8,
            second: ((time & 0x1F) * 2) as u8,
        }
    }

    /// Convert to a `SystemTime`, treating the stamp as UTC.
    ///
    /// Returns `None` for stamps with an out-of-range month or day.
    pub fn to_system_time(self) -> Option<SystemTime> {
        if !(1..=12).contains(&self.month) || self.day == 0 || self.day > 31 {
            return None;
        }

        // Days from civil date (proleptic Gregorian).
        let year = self.year as i64 - i64::from(self.month <= 2);
        let era = year.div_euclid(400);
        let year_of_era = year - era * 400;
        let month = self.month as i64;
        let shifted_month = if month > 2 { month - 3 } else { month + 9 };
        let day_of_year = (153 * shifted_month + 2) / 5 + self.day as i64 - 1;
        let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
        let days = era * 146097 + day_of_era - 719468;

        let seconds = days * 86400
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64;
        u64::try_from(seconds)
            .ok()
            .map(|s| UNIX_EPOCH + Duration::from_secs(s))
    }
}

impl fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
