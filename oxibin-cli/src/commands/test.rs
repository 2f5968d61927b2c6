//! Test command implementation.

use crate::utils::load_input;
use oxibin_archive::{ArchiveOptions, ZipArchive};
use std::path::Path;

pub fn cmd_test(archive: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_input(archive)?;
    let options = ArchiveOptions::new().with_verify_checksums(true);
    let zip = ZipArchive::with_options(&data, options)?;

    println!("Testing {}", archive.display());

    let mut total_files = 0usize;
    let mut ok_count = 0usize;
    let mut errors: Vec<(String, String)> = Vec::new();

    for entry in zip.iter().filter(|e| !e.is_dir()) {
        total_files += 1;

        match entry.data() {
            Ok(bytes) => {
                ok_count += 1;
                tracing::debug!(name = entry.name(), bytes = bytes.len(), "entry ok");
                if verbose {
                    println!("  OK: {}", entry.name());
                }
            }
            Err(e) => {
                errors.push((entry.name().to_string(), e.to_string()));
                if verbose {
                    println!("  FAILED: {} - {}", entry.name(), e);
                }
            }
        }
    }

    println!();
    println!("Test results:");
    println!("  Total files: {}", total_files);
    println!("  OK: {}", ok_count);
    println!("  Failed: {}", errors.len());

    if !errors.is_empty() && !verbose {
        println!();
        println!("Errors:");
        for (name, err) in &errors {
            println!("  {}: {}", name, err);
        }
    }

    if !errors.is_empty() {
        std::process::exit(2);
    }

    println!();
    println!("All files OK");
    Ok(())
}
