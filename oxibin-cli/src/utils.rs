//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use memmap2::Mmap;
use oxibin_archive::ZipEntry;
use std::fs::File;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

/// A whole input file, resident in memory.
pub enum InputBuffer {
    /// Memory-mapped file contents.
    Mapped(Mmap),
    /// Zero-length files cannot be mapped on every platform.
    Empty,
}

impl Deref for InputBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => map,
            Self::Empty => &[],
        }
    }
}

/// Map a file read-only.
pub fn load_input(path: &Path) -> std::io::Result<InputBuffer> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(InputBuffer::Empty);
    }
    // SAFETY: Read-only mapping, caller responsible for file stability
    let map = unsafe { Mmap::map(&file)? };
    tracing::debug!(path = %path.display(), bytes = map.len(), "mapped input");
    Ok(InputBuffer::Mapped(map))
}

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("█▓▒░ "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Check if a name matches the filter patterns.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |patterns: &[String]| {
        patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|pattern| pattern.matches(name))
    };

    if matches(exclude) {
        return false;
    }
    include.is_empty() || matches(include)
}

/// Filter entries based on include/exclude patterns.
pub fn filter_entries<'e, 'a>(
    entries: &'e [ZipEntry<'a>],
    include: &[String],
    exclude: &[String],
) -> Vec<&'e ZipEntry<'a>> {
    entries
        .iter()
        .filter(|e| matches_filters(e.name(), include, exclude))
        .collect()
}

/// Turn an entry name into a path under the output directory.
///
/// Returns `None` for absolute names, drive prefixes and any `..`
/// component. Backslashes are treated as separators.
pub fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut path = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if path.as_os_str().is_empty() || normalized.contains(':') {
        return None;
    }
    Some(path)
}

/// Space saved by compression, as a percentage.
pub fn savings(size: u64, compressed: u64) -> f64 {
    if size == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / size as f64) * 100.0
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[&ZipEntry<'_>], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.name());
        }
        return;
    }

    println!(
        "{:>10} {:>10} {:>6} {:>8} {:>19}  Name",
        "Size", "Compressed", "Ratio", "Method", "Modified",
    );
    println!("{}", "-".repeat(80));

    let mut total_size = 0u64;
    let mut total_compressed = 0u64;

    for entry in entries {
        let ratio = if entry.uncompressed_size() > 0 {
            format!(
                "{:.1}%",
                savings(entry.uncompressed_size(), entry.compressed_size())
            )
        } else {
            "-".to_string()
        };
        let type_prefix = if entry.is_dir() { "d " } else { "  " };

        println!(
            "{:>10} {:>10} {:>6} {:>8} {:>19}  {}{}",
            entry.uncompressed_size(),
            entry.compressed_size(),
            ratio,
            entry.method().to_string(),
            entry.dos_modified().to_string(),
            type_prefix,
            entry.name()
        );

        total_size += entry.uncompressed_size();
        total_compressed += entry.compressed_size();
    }

    println!("{}", "-".repeat(80));
    println!(
        "{:>10} {:>10} {:>5.1}%  {} entries",
        total_size,
        total_compressed,
        savings(total_size, total_compressed),
        entries.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters() {
        let include = vec!["*.onnx".to_string()];
        let exclude = vec!["tmp/*".to_string()];
        assert!(matches_filters("model.onnx", &include, &exclude));
        assert!(!matches_filters("tmp/model.onnx", &include, &exclude));
        assert!(!matches_filters("readme.md", &include, &exclude));
        assert!(matches_filters("readme.md", &[], &[]));
    }

    #[test]
    fn test_sanitize_entry_path() {
        assert_eq!(
            sanitize_entry_path("dir/./file.txt"),
            Some(PathBuf::from("dir").join("file.txt"))
        );
        assert_eq!(
            sanitize_entry_path("dir\\sub\\a.bin"),
            Some(PathBuf::from("dir").join("sub").join("a.bin"))
        );
        assert_eq!(sanitize_entry_path("../evil"), None);
        assert_eq!(sanitize_entry_path("a/../../evil"), None);
        assert_eq!(sanitize_entry_path("/etc/passwd"), None);
        assert_eq!(sanitize_entry_path("C:/windows"), None);
        assert_eq!(sanitize_entry_path(""), None);
    }

    #[test]
    fn test_savings() {
        assert_eq!(savings(0, 0), 0.0);
        assert_eq!(savings(100, 25), 75.0);
    }
}
