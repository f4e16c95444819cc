//! Link capability used by the content store and the mirror engine.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates a new directory entry `dest` that refers to the same data as `source`.
///
/// Implementations must not overwrite an existing `dest`; an existing destination is
/// reported as an error whose I/O kind is `AlreadyExists`.
pub trait Linker {
    fn link(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// OS hard links.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardLinker;

impl Linker for HardLinker {
    fn link(&self, source: &Path, dest: &Path) -> Result<()> {
        fs::hard_link(source, dest).map_err(|e| Error::filesystem("link", dest, e))
    }
}

impl<L: Linker + ?Sized> Linker for &L {
    fn link(&self, source: &Path, dest: &Path) -> Result<()> {
        (**self).link(source, dest)
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            fs::create_dir_all(parent)
                .map_err(|e| Error::filesystem("create directory", parent, e))?;
            tracing::debug!(dir = %parent.display(), "Created parent directory.");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// First path that blocks creating `dest` as a new link: `dest` itself if it already
/// exists, or the nearest existing ancestor that is not a directory.
pub fn find_blocking_path(dest: &Path) -> Option<PathBuf> {
    if fs::symlink_metadata(dest).is_ok() {
        return Some(dest.to_path_buf());
    }
    for ancestor in dest.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        match fs::metadata(ancestor) {
            Ok(m) if m.is_dir() => return None,
            Ok(_) => return Some(ancestor.to_path_buf()),
            Err(_) => continue,
        }
    }
    None
}

/// `err` says the link destination already existed.
pub fn is_already_exists(err: &Error) -> bool {
    match err {
        Error::Filesystem { source, .. } | Error::Io { source } => {
            source.kind() == std::io::ErrorKind::AlreadyExists
        }
        _ => false,
    }
}

/// Two paths name the same inode.
#[cfg(unix)]
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(m1), Ok(m2)) => m1.dev() == m2.dev() && m1.ino() == m2.ino(),
        _ => false,
    }
}
