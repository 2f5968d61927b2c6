//! Info command implementation.

use crate::utils::{load_input, savings};
use oxibin_archive::{CompressionMethod, ZipArchive};
use std::collections::BTreeMap;
use std::path::Path;

pub fn cmd_info(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_input(archive)?;
    let zip = ZipArchive::new(&data)?;

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Size: {} bytes", data.len());
    println!("ZIP64: {}", if zip.is_zip64() { "yes" } else { "no" });
    let comment = zip.comment();
    if !comment.is_empty() {
        println!("Comment: {}", comment);
    }

    let entries = zip.entries();
    let total_size: u64 = entries.iter().map(|e| e.uncompressed_size()).sum();
    let total_compressed: u64 = entries.iter().map(|e| e.compressed_size()).sum();

    let mut methods: BTreeMap<u16, (CompressionMethod, usize)> = BTreeMap::new();
    for entry in entries {
        methods
            .entry(entry.method().to_u16())
            .or_insert((entry.method(), 0))
            .1 += 1;
    }

    println!();
    println!("Contents:");
    println!("  Entries: {}", entries.len());
    if usize::from(zip.declared_entries()) != entries.len() {
        println!("  Declared entries: {}", zip.declared_entries());
    }
    println!(
        "  Files: {}",
        entries.iter().filter(|e| !e.is_dir()).count()
    );
    println!(
        "  Directories: {}",
        entries.iter().filter(|e| e.is_dir()).count()
    );
    println!("  Total size: {} bytes", total_size);
    println!("  Compressed size: {} bytes", total_compressed);
    if total_size > 0 {
        println!(
            "  Compression ratio: {:.1}%",
            savings(total_size, total_compressed)
        );
    }

    println!();
    println!("Methods:");
    for (method, count) in methods.values() {
        println!("  {}: {}", method, count);
    }

    if let Some(largest) = entries.iter().max_by_key(|e| e.uncompressed_size()) {
        println!();
        println!(
            "Largest entry: {} ({} bytes)",
            largest.name(),
            largest.uncompressed_size()
        );
    }

    Ok(())
}
