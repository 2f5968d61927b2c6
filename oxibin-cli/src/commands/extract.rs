//! Extract command implementation.

use crate::utils::{create_progress_bar, load_input, matches_filters, sanitize_entry_path};
use dialoguer::Confirm;
use filetime::FileTime;
use oxibin_archive::{ZipArchive, ZipEntry};
use rayon::prelude::*;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for extracting archive contents.
pub struct ExtractOptions<'a> {
    pub output: &'a Path,
    pub files: &'a [String],
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub verbose: bool,
    pub force: bool,
    pub progress: bool,
}

impl ExtractOptions<'_> {
    fn should_extract(&self, name: &str) -> bool {
        if !self.files.is_empty()
            && !self
                .files
                .iter()
                .any(|f| name == f || name.starts_with(&format!("{}/", f.trim_end_matches('/'))))
        {
            return false;
        }
        matches_filters(name, self.include, self.exclude)
    }
}

pub fn cmd_extract(
    archive: &Path,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_input(archive)?;
    let zip = ZipArchive::new(&data)?;

    println!(
        "Extracting {} to {}",
        archive.display(),
        options.output.display()
    );

    let mut files: Vec<(&ZipEntry<'_>, PathBuf)> = Vec::new();
    let mut skipped = 0usize;

    for entry in zip.iter().filter(|e| options.should_extract(e.name())) {
        let Some(relative) = sanitize_entry_path(entry.name()) else {
            tracing::warn!(name = entry.name(), "refusing path outside the output directory");
            skipped += 1;
            continue;
        };
        let target = options.output.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            if options.verbose {
                println!("  Created: {}", entry.name());
            }
            continue;
        }

        if target.exists() && !options.force && !confirm_overwrite(&target)? {
            tracing::info!(path = %target.display(), "kept existing file");
            skipped += 1;
            continue;
        }
        files.push((entry, target));
    }

    let started = Instant::now();
    let pb = create_progress_bar(files.len() as u64, options.progress);
    pb.set_message("files");

    let failures: Vec<(String, String)> = files
        .par_iter()
        .filter_map(|(entry, target)| {
            let result = write_entry(entry, target);
            pb.inc(1);
            match result {
                Ok(()) => {
                    if options.verbose {
                        pb.println(format!(
                            "  Extracted: {} ({} bytes)",
                            entry.name(),
                            entry.uncompressed_size()
                        ));
                    }
                    None
                }
                Err(e) => Some((entry.name().to_string(), e.to_string())),
            }
        })
        .collect();
    pb.finish_with_message("Done");

    tracing::info!(
        files = files.len(),
        skipped,
        failed = failures.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "extraction finished"
    );

    if !failures.is_empty() {
        println!();
        println!("Errors:");
        for (name, err) in &failures {
            println!("  {}: {}", name, err);
        }
        return Err(format!("{} of {} entries failed", failures.len(), files.len()).into());
    }

    Ok(())
}

fn confirm_overwrite(target: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if !std::io::stdin().is_terminal() {
        tracing::warn!(path = %target.display(), "exists; use --force to overwrite");
        return Ok(false);
    }
    let answer = Confirm::new()
        .with_prompt(format!("Overwrite {}?", target.display()))
        .default(false)
        .interact()?;
    Ok(answer)
}

fn write_entry(entry: &ZipEntry<'_>, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = entry.data()?;
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, data)?;

    #[cfg(unix)]
    if let Some(mode) = entry.unix_mode() {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(target, std::fs::Permissions::from_mode(mode & 0o777))?;
    }

    if let Some(modified) = entry.modified() {
        filetime::set_file_mtime(target, FileTime::from_system_time(modified))?;
    }
    Ok(())
}
