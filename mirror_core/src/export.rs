//! Rebuilding a directory tree from a manifest and the content store.

use crate::error::{Error, Result};
use crate::link::{Linker, ensure_parent, find_blocking_path, is_already_exists};
use crate::manifest::{ChecksumItem, parse_manifest, validate_items};
use crate::mirror::{ExportReport, ExportStage, ExportedFile, Mirror};
use crate::walk::file_exists;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl<L: Linker> Mirror<L> {
    /// Hardlink every manifest item out of the cache.
    ///
    /// Parsing, validation and the cache precheck each run to completion before the next
    /// stage starts, so nothing is linked unless every referenced digest is cached. Once
    /// linking starts, the first failure stops the export and earlier links stay in place.
    ///
    /// Relative item paths resolve against `target_root`, or against the manifest's own
    /// directory when no root is given. Absolute item paths are used as they are.
    pub fn export(&self, manifest: &Path, target_root: Option<&Path>) -> Result<ExportReport> {
        let _enter = self.span.enter();

        if manifest.as_os_str().is_empty() {
            return Err(Error::invalid_input("checksum file is not set"));
        }
        if !file_exists(manifest) {
            return Err(Error::invalid_input(format!(
                "checksum file is not found: {}",
                manifest.display()
            )));
        }
        info!(
            cache = %self.store.root().display(),
            checksum = %manifest.display(),
            root = ?target_root.map(|p| p.display().to_string()),
            "Start exporting files structure."
        );

        debug!(stage = ?ExportStage::Parsing);
        let content =
            fs::read_to_string(manifest).map_err(|e| Error::filesystem("read", manifest, e))?;
        let items = parse_manifest(&content)?;

        debug!(stage = ?ExportStage::Validating, items = items.len());
        validate_items(&items, self.algorithm)?;

        debug!(stage = ?ExportStage::PrecheckingCache);
        let missing = self.store.missing(items.iter().map(|i| i.hash.as_str()));
        if !missing.is_empty() {
            warn!(hashes = ?missing, "Items are not found in cache.");
            return Err(Error::missing_content(missing));
        }
        let target_root = self.resolve_target_root(manifest, target_root)?;

        debug!(stage = ?ExportStage::LinkingAll, root = %target_root.display());
        let mut files = Vec::with_capacity(items.len());
        for item in &items {
            files.push(self.export_item(item, &target_root)?);
        }

        Ok(ExportReport { target_root, files })
    }

    fn resolve_target_root(&self, manifest: &Path, target_root: Option<&Path>) -> Result<PathBuf> {
        let root = match target_root.filter(|p| !p.as_os_str().is_empty()) {
            Some(root) => {
                if file_exists(root) {
                    return Err(Error::conflict(root));
                }
                root.to_path_buf()
            }
            None => {
                warn!(
                    "Target path is not specified, it will be derived from checksum file path instead."
                );
                manifest
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf()
            }
        };
        std::path::absolute(&root).map_err(|e| Error::filesystem("resolve", root, e))
    }

    fn export_item(&self, item: &ChecksumItem, target_root: &Path) -> Result<ExportedFile> {
        let item_path = Path::new(&item.path);
        let destination = if item_path.is_absolute() {
            item_path.to_path_buf()
        } else {
            target_root.join(item_path)
        };

        if let Some(blocking) = find_blocking_path(&destination) {
            warn!(
                dest = %destination.display(),
                path = %blocking.display(),
                "Destination is blocked by an existing file."
            );
            return Err(Error::conflict(blocking));
        }

        ensure_parent(&destination)?;
        let source = match self.store.link_out(&item.hash, &destination) {
            Ok(source) => source,
            Err(e) if is_already_exists(&e) => return Err(Error::conflict(destination)),
            Err(e) => {
                warn!(
                    src = %self.store.entry_path(&item.hash).display(),
                    dest = %destination.display(),
                    "Failed to create hardlink."
                );
                return Err(e);
            }
        };
        info!(
            hash = %item.hash,
            src = %source.display(),
            dest = %destination.display(),
            "Exported file."
        );

        Ok(ExportedFile {
            hash: item.hash.clone(),
            source,
            destination,
        })
    }
}
