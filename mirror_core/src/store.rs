//! Hash-keyed cache directory of hardlinked files.

use crate::error::{Error, Result};
use crate::journal::{self, JournalEntry};
use crate::link::{HardLinker, Linker, is_already_exists};
use crate::walk::{dir_exists, file_exists};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of [`ContentStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new entry was linked into the cache.
    Created,
    /// An entry for this digest already existed; nothing was changed.
    AlreadyPresent,
}

/// A content store rooted at an existing directory.
///
/// Entries live at `<root>/<lowercase hex digest>`. An entry is created once and never
/// rewritten; every path that produced the digest shares its inode.
#[derive(Debug)]
pub struct ContentStore<L = HardLinker> {
    root: PathBuf,
    /// `root` with `..` and symlinks resolved.
    canonical_root: PathBuf,
    linker: L,
}

impl ContentStore<HardLinker> {
    /// Open the cache at `root` using OS hard links.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::with_linker(root, HardLinker)
    }
}

impl<L: Linker> ContentStore<L> {
    /// Open the cache at `root` with a custom link primitive.
    pub fn with_linker<P: AsRef<Path>>(root: P, linker: L) -> Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(Error::invalid_store(root, "cache directory is not set"));
        }
        if !dir_exists(root) {
            return Err(Error::invalid_store(root, "cache directory not found"));
        }
        let canonical_root =
            fs::canonicalize(root).map_err(|e| Error::filesystem("resolve", root, e))?;
        let root = std::path::absolute(root).map_err(|e| Error::filesystem("resolve", root, e))?;
        Ok(Self {
            root,
            canonical_root,
            linker,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn linker(&self) -> &L {
        &self.linker
    }

    /// `path` lies inside the cache directory once `..` and symlinks are resolved.
    pub fn is_inside(&self, path: &Path) -> bool {
        if path.starts_with(&self.root) {
            return true;
        }
        fs::canonicalize(path)
            .map(|real| real.starts_with(&self.canonical_root))
            .unwrap_or(false)
    }

    /// Path of the entry for `hex_digest`.
    ///
    /// Digests are matched case-insensitively; entries are always named in lowercase.
    pub fn entry_path(&self, hex_digest: &str) -> PathBuf {
        self.root.join(hex_digest.to_ascii_lowercase())
    }

    /// An entry for `hex_digest` exists.
    pub fn contains(&self, hex_digest: &str) -> bool {
        file_exists(&self.entry_path(hex_digest))
    }

    /// Digests from `hashes` that have no entry, in first-seen order without duplicates.
    pub fn missing<'a, I>(&self, hashes: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for hash in hashes {
            if !self.contains(hash) && !missing.iter().any(|m| m == hash) {
                missing.push(hash.to_string());
            }
        }
        missing
    }

    /// Link `source` into the cache as `hex_digest` unless an entry already exists.
    ///
    /// An entry that appears between the existence check and the link call counts as
    /// already present.
    pub fn insert(&self, source: &Path, hex_digest: &str) -> Result<Insertion> {
        let entry = self.entry_path(hex_digest);
        if file_exists(&entry) {
            return Ok(Insertion::AlreadyPresent);
        }
        match self.linker.link(source, &entry) {
            Ok(()) => Ok(Insertion::Created),
            Err(e) if is_already_exists(&e) => Ok(Insertion::AlreadyPresent),
            Err(e) => Err(e),
        }
    }

    /// Link the entry for `hex_digest` to `dest`.
    pub fn link_out(&self, hex_digest: &str, dest: &Path) -> Result<PathBuf> {
        let entry = self.entry_path(hex_digest);
        self.linker.link(&entry, dest)?;
        Ok(entry)
    }

    /// Write a rollback journal stamped with the current time.
    pub fn write_journal(&self, entries: &[JournalEntry]) -> Result<PathBuf> {
        let millis = chrono::Utc::now().timestamp_millis();
        journal::write_journal(&self.root, entries, millis)
    }

    /// Rollback journals in this cache, oldest first.
    pub fn journals(&self) -> Result<Vec<PathBuf>> {
        journal::list_journals(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn setup() -> (TempDir, ContentStore) {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("cache")).unwrap();
        let store = ContentStore::open(temp_dir.path().join("cache")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_open_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = ContentStore::open(temp_dir.path().join("nope"));
        assert!(matches!(result, Err(Error::InvalidStore { .. })));
    }

    #[test]
    fn test_open_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("cache");
        fs::write(&file, b"").unwrap();
        assert!(ContentStore::open(&file).is_err());
    }

    #[test]
    fn test_open_rejects_empty_path() {
        assert!(ContentStore::open("").is_err());
    }

    #[test]
    fn test_is_inside_resolves_parent_components() {
        let (temp_dir, store) = setup();
        fs::create_dir(temp_dir.path().join("x")).unwrap();
        fs::write(store.root().join("entry"), b"").unwrap();
        fs::write(temp_dir.path().join("outside"), b"").unwrap();

        assert!(store.is_inside(&store.root().join("entry")));
        assert!(store.is_inside(&temp_dir.path().join("x/../cache/entry")));
        assert!(!store.is_inside(&temp_dir.path().join("outside")));
        assert!(!store.is_inside(&temp_dir.path().join("cache-sibling")));
    }

    #[test]
    #[cfg(unix)]
    fn test_is_inside_follows_symlinked_directory() {
        let (temp_dir, store) = setup();
        fs::write(store.root().join("entry"), b"").unwrap();
        let alias = temp_dir.path().join("alias");
        std::os::unix::fs::symlink(store.root(), &alias).unwrap();

        assert!(store.is_inside(&alias.join("entry")));
    }

    #[test]
    fn test_entry_path_lowercases() {
        let (_temp_dir, store) = setup();
        let upper = ABC_SHA256.to_ascii_uppercase();
        assert_eq!(store.entry_path(&upper), store.root().join(ABC_SHA256));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("abc.txt");
        fs::write(&source, b"abc").unwrap();

        assert_eq!(store.insert(&source, ABC_SHA256).unwrap(), Insertion::Created);
        assert_eq!(
            store.insert(&source, ABC_SHA256).unwrap(),
            Insertion::AlreadyPresent
        );
        assert!(store.contains(ABC_SHA256));
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_insert_shares_inode() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("abc.txt");
        fs::write(&source, b"abc").unwrap();

        store.insert(&source, ABC_SHA256).unwrap();
        assert!(crate::link::is_same_file(&source, &store.entry_path(ABC_SHA256)));
    }

    #[test]
    fn test_missing_deduplicates() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("abc.txt");
        fs::write(&source, b"abc").unwrap();
        store.insert(&source, ABC_SHA256).unwrap();

        let missing = store.missing(["aa", ABC_SHA256, "bb", "aa"]);
        assert_eq!(missing, vec!["aa".to_string(), "bb".to_string()]);
    }

    #[test]
    fn test_link_out() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("abc.txt");
        fs::write(&source, b"abc").unwrap();
        store.insert(&source, ABC_SHA256).unwrap();

        let dest = temp_dir.path().join("copy.txt");
        let entry = store.link_out(ABC_SHA256, &dest).unwrap();
        assert_eq!(entry, store.entry_path(ABC_SHA256));
        assert_eq!(fs::read(&dest).unwrap(), b"abc");
    }

    #[test]
    fn test_journals_roundtrip() {
        let (_temp_dir, store) = setup();
        let entries = vec![JournalEntry::new("/x", ABC_SHA256)];
        let path = store.write_journal(&entries).unwrap();

        assert_eq!(store.journals().unwrap(), vec![path.clone()]);
        assert_eq!(journal::read_journal(&path).unwrap(), entries);
    }
}
