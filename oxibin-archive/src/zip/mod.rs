//! ZIP archive format support.
//!
//! This module reads ZIP archives as specified in the PKWARE APPNOTE:
//! End-Of-Central-Directory location (with ZIP64 fallback), central
//! directory records, local header verification and lazy payload access.
//! Only stored (0) and deflated (8) entries can be decompressed.

mod archive;
mod entry;
mod header;

pub use archive::{ArchiveOptions, ZipArchive};
pub use entry::ZipEntry;
pub use header::{
    CENTRAL_DIR_HEADER_SIG, CentralDirectoryRecord, CompressionMethod, DosDateTime,
    END_OF_CENTRAL_DIR_SIG, EndOfCentralDirectory, LOCAL_FILE_HEADER_SIG, LocalFileHeader,
    ZIP64_END_OF_CENTRAL_DIR_SIG, ZIP64_EXTRA_FIELD_ID,
};

use oxibin_core::error::Result;

/// Read a ZIP archive from an in-memory buffer.
pub fn read_zip(data: &[u8]) -> Result<ZipArchive<'_>> {
    ZipArchive::new(data)
}
