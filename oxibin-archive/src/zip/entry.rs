//! ZIP entries with lazily decompressed payloads.

use super::header::{CentralDirectoryRecord, CompressionMethod, DosDateTime, LocalFileHeader};
use oxibin_core::error::{OxiBinError, Result};
use oxibin_core::{ByteCursor, Crc32};
use oxibin_deflate::inflate_raw_with_limit;
use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::SystemTime;

/// One file or directory in a ZIP archive.
///
/// Metadata comes from the central directory; the name and payload location
/// come from the local header. Stored payloads are served straight from the
/// archive buffer. Deflated payloads are inflated on first access and the
/// result is cached for the life of the entry.
#[derive(Debug)]
pub struct ZipEntry<'a> {
    record: CentralDirectoryRecord<'a>,
    name_bytes: &'a [u8],
    name: Cow<'a, str>,
    raw: &'a [u8],
    verify_checksum: bool,
    inflated: OnceLock<Vec<u8>>,
}

impl<'a> ZipEntry<'a> {
    /// Resolve a central directory record against its local header.
    pub(crate) fn new(
        archive: &'a [u8],
        record: CentralDirectoryRecord<'a>,
        verify_checksum: bool,
    ) -> Result<Self> {
        let local = LocalFileHeader::read(archive, record.local_header_offset)?;

        let length = usize::try_from(record.compressed_size).map_err(|_| {
            OxiBinError::out_of_range(local.data_offset, usize::MAX, archive.len())
        })?;
        let mut cursor = ByteCursor::new(archive);
        cursor.seek(local.data_offset)?;
        let raw = cursor.read(length)?;

        Ok(Self {
            record,
            name_bytes: local.name,
            name: encoding_rs::mem::decode_latin1(local.name),
            raw,
            verify_checksum,
            inflated: OnceLock::new(),
        })
    }

    /// Entry name, each byte taken as one character.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw name bytes from the local header.
    pub fn name_bytes(&self) -> &'a [u8] {
        self.name_bytes
    }

    /// Compression method.
    pub fn method(&self) -> CompressionMethod {
        self.record.method
    }

    /// Compressed size in bytes.
    pub fn compressed_size(&self) -> u64 {
        self.record.compressed_size
    }

    /// Declared uncompressed size in bytes.
    pub fn uncompressed_size(&self) -> u64 {
        self.record.uncompressed_size
    }

    /// Offset of the local file header.
    pub fn local_header_offset(&self) -> u64 {
        self.record.local_header_offset
    }

    /// CRC-32 declared by the central directory.
    pub fn crc32(&self) -> u32 {
        self.record.crc32
    }

    /// General purpose flags.
    pub fn flags(&self) -> u16 {
        self.record.flags
    }

    /// Entry comment bytes.
    pub fn comment(&self) -> &'a [u8] {
        self.record.comment
    }

    /// Unix permission bits, when the entry was made on a Unix host.
    pub fn unix_mode(&self) -> Option<u32> {
        const UNIX_HOST: u16 = 3;
        let mode = self.record.external_attributes >> 16;
        (self.record.version_made_by >> 8 == UNIX_HOST && mode != 0).then_some(mode)
    }

    /// Whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Raw DOS modification stamp.
    pub fn dos_modified(&self) -> DosDateTime {
        DosDateTime::from_dos(self.record.mdate, self.record.mtime)
    }

    /// Modification time, if the DOS stamp is valid.
    pub fn modified(&self) -> Option<SystemTime> {
        self.dos_modified().to_system_time()
    }

    /// Compressed payload as stored in the archive.
    pub fn raw_data(&self) -> &'a [u8] {
        self.raw
    }

    /// Whether a deflated payload has already been inflated.
    pub fn is_cached(&self) -> bool {
        self.inflated.get().is_some()
    }

    /// Uncompressed payload.
    ///
    /// Stored entries borrow the archive buffer. Deflated entries are
    /// inflated once; later calls return the cached bytes.
    pub fn data(&self) -> Result<&[u8]> {
        match self.record.method {
            CompressionMethod::Stored => {
                if self.record.compressed_size != self.record.uncompressed_size {
                    return Err(OxiBinError::size_mismatch(
                        self.record.uncompressed_size,
                        self.record.compressed_size,
                    ));
                }
                self.verify(self.raw)?;
                Ok(self.raw)
            }
            CompressionMethod::Deflate => {
                if let Some(data) = self.inflated.get() {
                    return Ok(data);
                }
                let expected = self.record.uncompressed_size;
                let data = inflate_raw_with_limit(self.raw, expected)?;
                if data.len() as u64 != expected {
                    return Err(OxiBinError::size_mismatch(expected, data.len() as u64));
                }
                self.verify(&data)?;
                Ok(self.inflated.get_or_init(|| data))
            }
            CompressionMethod::Unknown(method) => Err(OxiBinError::unsupported_method(method)),
        }
    }

    /// A cursor over the uncompressed payload.
    pub fn cursor(&self) -> Result<ByteCursor<'_>> {
        Ok(ByteCursor::new(self.data()?))
    }

    fn verify(&self, data: &[u8]) -> Result<()> {
        if !self.verify_checksum {
            return Ok(());
        }
        let computed = Crc32::compute(data);
        if computed != self.record.crc32 {
            return Err(OxiBinError::crc_mismatch(self.record.crc32, computed));
        }
        Ok(())
    }
}
