//! ZIP archive reader.

use super::entry::ZipEntry;
use super::header::{CENTRAL_DIR_HEADER_SIG, CentralDirectoryRecord, EndOfCentralDirectory};
use oxibin_core::ByteCursor;
use oxibin_core::error::{OxiBinError, Result};
use std::borrow::Cow;

/// Options for opening an archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// Check each payload against its central directory CRC-32 on first access.
    pub verify_checksums: bool,
}

impl ArchiveOptions {
    /// Create default options (no checksum verification).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable checksum verification.
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }
}

/// A ZIP archive held in memory.
///
/// Entries are listed in central directory order, which need not match the
/// order of the payloads in the file.
///
/// # Example
///
/// ```no_run
/// use oxibin_archive::ZipArchive;
///
/// let bytes = std::fs::read("model.zip").unwrap();
/// let archive = ZipArchive::new(&bytes).unwrap();
/// for entry in &archive {
///     println!("{} ({} bytes)", entry.name(), entry.uncompressed_size());
/// }
/// ```
#[derive(Debug)]
pub struct ZipArchive<'a> {
    entries: Vec<ZipEntry<'a>>,
    comment: &'a [u8],
    declared_entries: u16,
    zip64: bool,
}

impl<'a> ZipArchive<'a> {
    /// Parse an archive with default options.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, ArchiveOptions::default())
    }

    /// Parse an archive.
    ///
    /// The central directory is walked until a record without the
    /// `PK\x01\x02` signature is found. Every entry's local header is
    /// checked here; payloads are not touched until [`ZipEntry::data`].
    pub fn with_options(data: &'a [u8], options: ArchiveOptions) -> Result<Self> {
        if data.len() < 4 || &data[..2] != b"PK" {
            return Err(OxiBinError::invalid_magic(
                0,
                b"PK".to_vec(),
                data[..data.len().min(2)].to_vec(),
            ));
        }

        let eocd = EndOfCentralDirectory::locate(data)?;

        let mut cursor = ByteCursor::new(data);
        cursor.seek(eocd.central_directory_offset as usize)?;

        let mut records = Vec::with_capacity(eocd.total_entries as usize);
        while cursor.remaining() > 4 && cursor.peek(4)? == CENTRAL_DIR_HEADER_SIG {
            cursor.skip(4)?;
            records.push(CentralDirectoryRecord::read(&mut cursor)?);
        }

        let entries = records
            .into_iter()
            .map(|record| ZipEntry::new(data, record, options.verify_checksums))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            comment: eocd.comment,
            declared_entries: eocd.total_entries,
            zip64: eocd.zip64,
        })
    }

    /// All entries, in central directory order.
    pub fn entries(&self) -> &[ZipEntry<'a>] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ZipEntry<'a>> {
        self.entries.iter()
    }

    /// Find an entry by exact name.
    pub fn entry_by_name(&self, name: &str) -> Option<&ZipEntry<'a>> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Archive comment.
    pub fn comment(&self) -> Cow<'a, str> {
        encoding_rs::mem::decode_latin1(self.comment)
    }

    /// Entry count declared by the end of central directory record.
    ///
    /// May differ from [`len`](Self::len) for damaged or multi-disk archives.
    pub fn declared_entries(&self) -> u16 {
        self.declared_entries
    }

    /// Whether the central directory was located through a ZIP64 record.
    pub fn is_zip64(&self) -> bool {
        self.zip64
    }
}

impl<'a, 'b> IntoIterator for &'b ZipArchive<'a> {
    type Item = &'b ZipEntry<'a>;
    type IntoIter = std::slice::Iter<'b, ZipEntry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
