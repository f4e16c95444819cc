//! # Mirror Core
//!
//! Checksum manifests and a hardlinked, digest-keyed file cache.
//!
//! A scan hashes files and links each one into the cache under its lowercase hex
//! SHA-256, so identical content shares one inode. An export reads a `sha256sum`-style
//! manifest and rebuilds the described tree by linking cache entries back out.
//!
//! ## Features
//!
//! - Hand-written manifest lexer and parser with precise syntax errors
//! - Digest validation for SHA-2 and BLAKE3 manifests
//! - One-pass multi-algorithm hashing
//! - Rollback journal written before any scan link is made
//! - All-or-nothing cache precheck before export links anything
//!
//! ## Example
//!
//! ```no_run
//! use mirror_core::{Mirror, ScanOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mirror = Mirror::open("./cache")?;
//!
//! // Deduplicate a directory into the cache
//! let report = mirror.scan(&["./photos"], ScanOptions::default())?;
//! println!("{} cached, {} skipped", report.created(), report.skipped());
//!
//! // Rebuild a tree from a manifest
//! let export = mirror.export(Path::new("./photos.sha256"), Some(Path::new("./restored")))?;
//! println!("{} files exported", export.files.len());
//! # Ok(())
//! # }
//! ```

mod checksum;
mod error;
mod export;
mod hash;
mod journal;
mod link;
pub mod manifest;
mod mirror;
mod scan;
mod store;
mod walk;

pub use checksum::{ChecksumFile, DEFAULT_OUTPUT_STEM, create_checksums, output_path};
pub use error::{Error, Result};
pub use hash::{
    Algorithm, HashResult, MAX_BUFFER_SIZE, buffer_size, hash_file, hash_file_named,
    hash_file_single, hash_reader, sha256_file,
};
pub use journal::{JournalEntry, journal_file_name, journal_timestamp, list_journals, read_journal};
pub use link::{HardLinker, Linker};
#[cfg(unix)]
pub use link::is_same_file;
pub use manifest::{
    ChecksumItem, parse_and_validate, parse_manifest, parse_sha256, read_manifest,
    write_manifest,
};
pub use mirror::{
    ExportReport, ExportStage, ExportedFile, Mirror, ScanOptions, ScanReport, ScannedFile,
};
pub use store::{ContentStore, Insertion};
pub use walk::{FsEntry, ListOptions, list};
