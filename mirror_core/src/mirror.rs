//! Mirror engine: scan inputs into the content store, export trees back out.

use crate::error::Result;
use crate::hash::Algorithm;
use crate::link::{HardLinker, Linker};
use crate::store::ContentStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Span;

/// Scan behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Skip files excluded by ignore files and hidden files.
    pub respect_ignore_files: bool,
}

/// One file seen by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedFile {
    pub source: PathBuf,
    pub hash: String,
    pub size: u64,
    /// `true` if this scan created the cache entry, `false` if it already existed.
    pub created: bool,
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub journal: PathBuf,
    pub files: Vec<ScannedFile>,
}

impl ScanReport {
    pub fn created(&self) -> usize {
        self.files.iter().filter(|f| f.created).count()
    }

    pub fn skipped(&self) -> usize {
        self.files.len() - self.created()
    }
}

/// One link made by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFile {
    pub hash: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub target_root: PathBuf,
    pub files: Vec<ExportedFile>,
}

/// Export phases. Each one completes before the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Parsing,
    Validating,
    PrecheckingCache,
    LinkingAll,
}

/// Scans files into a [`ContentStore`] and rebuilds trees from manifests.
pub struct Mirror<L = HardLinker> {
    pub(crate) store: ContentStore<L>,
    pub(crate) algorithm: Algorithm,
    pub(crate) span: Span,
}

impl Mirror<HardLinker> {
    /// Open a mirror over the cache directory at `cache_dir`.
    pub fn open<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        Ok(Self::new(ContentStore::open(cache_dir)?))
    }
}

impl<L: Linker> Mirror<L> {
    pub fn new(store: ContentStore<L>) -> Self {
        Self {
            store,
            algorithm: Algorithm::Sha256,
            span: tracing::info_span!("mirror"),
        }
    }

    /// Run operations inside `span` instead of the default `mirror` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn store(&self) -> &ContentStore<L> {
        &self.store
    }

    /// Digest used for cache keys and manifest validation.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}
