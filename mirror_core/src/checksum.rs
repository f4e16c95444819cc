//! Writing checksum manifests for a set of inputs.

use crate::error::{Error, Result};
use crate::hash::{Algorithm, HashResult, hash_file};
use crate::manifest::{ChecksumItem, write_manifest};
use crate::walk::{self, ListOptions};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Stem used when no output path is given.
pub const DEFAULT_OUTPUT_STEM: &str = "checksum";

/// One manifest written by [`create_checksums`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumFile {
    pub algorithm: Algorithm,
    pub path: PathBuf,
    pub line_count: usize,
}

/// Manifest path for `algorithm`: the output's extension replaced by the algorithm name.
pub fn output_path(output: Option<&Path>, algorithm: Algorithm) -> PathBuf {
    let stem = output
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_STEM));
    stem.with_extension(algorithm.as_str())
}

/// Hash every file under `inputs` and write one binary-mode manifest per algorithm.
///
/// Each file is read once for all algorithms. Manifest paths are the listed paths as
/// given on input, so a relative input produces relative manifest lines.
pub fn create_checksums<P: AsRef<Path>>(
    inputs: &[P],
    output: Option<&Path>,
    algorithms: &[Algorithm],
) -> Result<Vec<ChecksumFile>> {
    if algorithms.is_empty() {
        return Err(Error::invalid_input("hash algorithm is not specified"));
    }
    if inputs.is_empty() {
        return Err(Error::invalid_input("inputs is empty"));
    }
    info!(
        algos = ?algorithms.iter().map(Algorithm::as_str).collect::<Vec<_>>(),
        output = ?output.map(|p| p.display().to_string()),
        "Start computing hashes."
    );

    let entries = walk::list(
        inputs,
        ListOptions {
            recursive: true,
            respect_ignore_files: false,
        },
    )?;

    let mut results: Vec<HashResult> = Vec::new();
    for entry in entries.iter().filter(|e| e.is_file) {
        walk::path_to_str(&entry.relative_path)?;
        let file_results = hash_file(&entry.relative_path, algorithms)?;
        info!(
            file = %entry.relative_path.display(),
            size = file_results.first().map(|r| r.size).unwrap_or_default(),
            "Hashed file."
        );
        results.extend(file_results);
    }

    let mut written = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        let items = results
            .iter()
            .filter(|r| r.algorithm == algorithm)
            .map(|r| Ok(ChecksumItem::new(r.to_hex(), true, walk::path_to_str(&r.path)?)))
            .collect::<Result<Vec<ChecksumItem>>>()?;

        let path = output_path(output, algorithm);
        fs::write(&path, write_manifest(&items))
            .map_err(|e| Error::filesystem("write", &path, e))?;
        info!(lines = items.len(), path = %path.display(), "Written checksum file.");

        written.push(ChecksumFile {
            algorithm,
            path,
            line_count: items.len(),
        });
    }

    Ok(written)
}
