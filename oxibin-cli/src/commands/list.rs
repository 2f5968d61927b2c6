//! List command implementation.

use crate::utils::{filter_entries, load_input, print_entries, savings};
use oxibin_archive::{ZipArchive, ZipEntry};
use serde::Serialize;
use std::path::Path;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize)]
struct EntryJson {
    name: String,
    size: u64,
    compressed_size: u64,
    ratio: f64,
    method: String,
    crc: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
    offset: u64,
    is_dir: bool,
}

impl EntryJson {
    fn from_entry(entry: &ZipEntry<'_>) -> Self {
        let mtime = entry.modified().and_then(|t| {
            t.duration_since(std::time::UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs() as i64)
        });

        Self {
            name: entry.name().to_string(),
            size: entry.uncompressed_size(),
            compressed_size: entry.compressed_size(),
            ratio: savings(entry.uncompressed_size(), entry.compressed_size()),
            method: entry.method().to_string(),
            crc: entry.crc32(),
            mtime,
            mode: entry.unix_mode(),
            offset: entry.local_header_offset(),
            is_dir: entry.is_dir(),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize)]
struct ArchiveListJson {
    archive: String,
    zip64: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    comment: String,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(archive: &Path, options: &ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_input(archive)?;
    let zip = ZipArchive::new(&data)?;
    tracing::info!(entries = zip.len(), zip64 = zip.is_zip64(), "read central directory");

    let filtered = filter_entries(zip.entries(), options.include, options.exclude);

    if options.json {
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            zip64: zip.is_zip64(),
            comment: zip.comment().into_owned(),
            entries: filtered.iter().map(|e| EntryJson::from_entry(e)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Archive: {}", archive.display());
    println!();
    print_entries(&filtered, options.verbose);
    Ok(())
}
