//! Rollback journals written by scans.
//!
//! Each scan writes one JSON array of `{"s": source, "h": hash}` records to
//! `mirror-<epochMillis>.json` inside the cache directory.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const JOURNAL_PREFIX: &str = "mirror-";
const JOURNAL_SUFFIX: &str = ".json";

/// Source path and the hex digest it was cached under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(rename = "s", default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(rename = "h", default, skip_serializing_if = "String::is_empty")]
    pub hash: String,
}

impl JournalEntry {
    pub fn new(source: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            hash: hash.into(),
        }
    }
}

/// File name for a journal created at `millis`.
pub fn journal_file_name(millis: i64) -> String {
    format!("{}{}{}", JOURNAL_PREFIX, millis, JOURNAL_SUFFIX)
}

/// Timestamp encoded in a journal file name.
pub fn journal_timestamp(path: &Path) -> Option<i64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(JOURNAL_PREFIX)?
        .strip_suffix(JOURNAL_SUFFIX)?
        .parse()
        .ok()
}

/// Write `entries` to a new journal file in `dir`.
///
/// The file is written to a temporary name and then moved into place without
/// replacing anything. If `mirror-<millis>.json` is taken, the next millisecond is tried.
pub fn write_journal(dir: &Path, entries: &[JournalEntry], millis: i64) -> Result<PathBuf> {
    let content = serde_json::to_vec(entries)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::filesystem("create journal in", dir, e))?;
    temp_file.write_all(&content)?;
    temp_file.write_all(b"\n")?;
    temp_file.flush()?;

    let mut millis = millis;
    loop {
        let path = dir.join(journal_file_name(millis));
        match temp_file.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                temp_file = e.file;
                millis += 1;
            }
            Err(e) => return Err(Error::filesystem("write journal", path, e.error)),
        }
    }
}

/// Load the entries of one journal file.
pub fn read_journal(path: &Path) -> Result<Vec<JournalEntry>> {
    let content = fs::read(path).map_err(|e| Error::filesystem("read", path, e))?;
    Ok(serde_json::from_slice(&content)?)
}

/// Journal files in `dir`, oldest first.
pub fn list_journals(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut journals: Vec<(i64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::filesystem("read directory", dir, e))? {
        let path = entry?.path();
        if let Some(ts) = journal_timestamp(&path) {
            journals.push((ts, path));
        }
    }
    journals.sort();
    Ok(journals.into_iter().map(|(_, p)| p).collect())
}
