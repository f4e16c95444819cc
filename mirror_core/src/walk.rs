//! Recursive listing of input files and directories.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A listed file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FsEntry {
    /// Absolute form of the path (not canonicalized; symlinks are kept).
    pub absolute_path: PathBuf,
    /// Path as given, or joined onto the input it was found under.
    pub relative_path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    /// Regular file (not a directory, symlink or special file).
    pub is_file: bool,
}

impl FsEntry {
    fn new(path: &Path, file_type: fs::FileType) -> Result<Self> {
        let absolute_path =
            std::path::absolute(path).map_err(|e| Error::filesystem("resolve", path, e))?;
        let name = absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            absolute_path,
            relative_path: path.to_path_buf(),
            name,
            is_dir: file_type.is_dir(),
            is_file: file_type.is_file(),
        })
    }
}

/// Listing options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Descend into directories.
    pub recursive: bool,
    /// Skip paths excluded by `.gitignore`/`.ignore` files and hidden files.
    pub respect_ignore_files: bool,
}

/// List `inputs`, then (if recursive) everything beneath the directories among them.
///
/// Each input is emitted before its children; siblings are ordered by file name.
/// Symlinks are listed but not followed.
pub fn list<P: AsRef<Path>>(inputs: &[P], options: ListOptions) -> Result<Vec<FsEntry>> {
    let mut entries = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let metadata =
            fs::symlink_metadata(input).map_err(|e| Error::filesystem("stat", input, e))?;

        if !options.recursive || !metadata.is_dir() {
            entries.push(FsEntry::new(input, metadata.file_type())?);
            continue;
        }

        let walker = ignore::WalkBuilder::new(input)
            .standard_filters(options.respect_ignore_files)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry?;
            let file_type = match entry.file_type() {
                Some(ft) => ft,
                None => fs::symlink_metadata(entry.path())
                    .map_err(|e| Error::filesystem("stat", entry.path(), e))?
                    .file_type(),
            };
            entries.push(FsEntry::new(entry.path(), file_type)?);
        }
    }

    tracing::debug!(inputs = inputs.len(), count = entries.len(), "Listed entries.");
    Ok(entries)
}

/// `path` as UTF-8 text, for manifests and journals.
///
/// Paths that are not valid UTF-8 are rejected; a lossy rendering would name a file that
/// does not exist.
pub fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        Error::invalid_input(format!("path is not valid UTF-8: {}", path.display()))
    })
}

/// `path` exists and is not a directory.
pub fn file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}

/// `path` exists and is a directory.
pub fn dir_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}
