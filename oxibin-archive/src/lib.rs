//! # OxiBin Archive
//!
//! Archive container support for OxiBin.
//!
//! - **ZIP**: central directory and local header parsing, ZIP64 offsets,
//!   stored and deflated entries
//!
//! Archives are read from a buffer the caller has already loaded. Entry
//! payloads are decompressed on first access and cached.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxibin_archive::zip::{ArchiveOptions, ZipArchive};
//!
//! let bytes = std::fs::read("model.zip").unwrap();
//! let archive =
//!     ZipArchive::with_options(&bytes, ArchiveOptions::new().with_verify_checksums(true)).unwrap();
//! if let Some(entry) = archive.entry_by_name("model/data.pkl") {
//!     let data = entry.data().unwrap();
//!     println!("{} bytes", data.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod zip;

// Re-exports
pub use zip::{ArchiveOptions, CompressionMethod, ZipArchive, ZipEntry, read_zip};
