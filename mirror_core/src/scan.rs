//! Scanning inputs into the content store.

use crate::error::{Error, Result};
use crate::hash::{HashResult, hash_file_single};
use crate::journal::JournalEntry;
use crate::link::Linker;
use crate::mirror::{Mirror, ScanOptions, ScanReport, ScannedFile};
use crate::store::Insertion;
use crate::walk::{self, ListOptions, path_to_str};
use std::path::Path;
use tracing::{debug, info};

impl<L: Linker> Mirror<L> {
    /// Hash every regular file under `inputs` and link each into the cache.
    ///
    /// The rollback journal for the whole scan is written before the first link is
    /// made; a journal failure therefore leaves the cache untouched. The first failing
    /// hash or link aborts the scan, keeping links already made.
    pub fn scan<P: AsRef<Path>>(&self, inputs: &[P], options: ScanOptions) -> Result<ScanReport> {
        let _enter = self.span.enter();

        if inputs.is_empty() {
            return Err(Error::invalid_input("inputs is empty"));
        }
        let input_list: Vec<String> = inputs
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect();
        info!(
            cache = %self.store.root().display(),
            inputs = ?input_list,
            "Start scanning files."
        );

        let entries = walk::list(
            inputs,
            ListOptions {
                recursive: true,
                respect_ignore_files: options.respect_ignore_files,
            },
        )?;

        let mut hashed: Vec<HashResult> = Vec::new();
        for entry in &entries {
            if entry.is_dir {
                continue;
            }
            if !entry.is_file {
                debug!(path = %entry.relative_path.display(), "Skipped. Not a regular file.");
                continue;
            }
            if self.store.is_inside(&entry.absolute_path) {
                debug!(
                    path = %entry.relative_path.display(),
                    "Skipped. File is inside the cache."
                );
                continue;
            }
            path_to_str(&entry.absolute_path)?;

            let mut result = hash_file_single(&entry.relative_path, self.algorithm)?;
            info!(
                algo = %self.algorithm,
                path = %entry.relative_path.display(),
                size = result.size,
                "Hashed file."
            );
            result.path = entry.absolute_path.clone();
            hashed.push(result);
        }

        let journal_entries = hashed
            .iter()
            .map(|r| Ok(JournalEntry::new(path_to_str(&r.path)?, r.to_hex())))
            .collect::<Result<Vec<JournalEntry>>>()?;
        let journal = self.store.write_journal(&journal_entries)?;
        info!(
            count = journal_entries.len(),
            path = %journal.display(),
            "Written rollback file."
        );

        let mut files = Vec::with_capacity(hashed.len());
        for result in hashed {
            let hash = result.to_hex();
            let created = match self.store.insert(&result.path, &hash)? {
                Insertion::Created => {
                    info!(
                        src = %result.path.display(),
                        target = %self.store.entry_path(&hash).display(),
                        "Created cache file."
                    );
                    true
                }
                Insertion::AlreadyPresent => {
                    info!(
                        src = %result.path.display(),
                        cache = %self.store.entry_path(&hash).display(),
                        "Skipped. File is already cached."
                    );
                    false
                }
            };
            files.push(ScannedFile {
                source: result.path,
                hash,
                size: result.size,
                created,
            });
        }

        Ok(ScanReport { journal, files })
    }
}
