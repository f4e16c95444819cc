mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mirror_core::{
    Algorithm, Mirror, ScanOptions, create_checksums, journal_timestamp, read_journal,
};
use output::{
    ChecksumOutput, ExportOutput, JournalInfo, JournalOutput, OutputWriter, ScanOutput,
    format_millis,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the default cache directory.
const CACHE_ENV: &str = "MIRROR_CACHE";
/// Environment variable holding the log filter.
const LOG_ENV: &str = "MIRROR_LOG";

/// Mirror - deduplicate files into a hardlinked cache and rebuild trees from checksums
#[derive(Parser)]
#[command(name = "mirror")]
#[command(about = "Hardlinked SHA-256 file cache driven by checksum manifests", long_about = None)]
#[command(version)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug events (overridden by MIRROR_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash files and link them into the cache
    Scan {
        /// Cache directory (defaults to MIRROR_CACHE env var)
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// Files or directories to scan
        #[arg(short, long, required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Skip hidden files and paths excluded by .gitignore/.ignore
        #[arg(long)]
        respect_ignore: bool,
    },

    /// Rebuild the tree described by a checksum file from the cache
    Export {
        /// Cache directory (defaults to MIRROR_CACHE env var)
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// SHA-256 checksum file
        #[arg(long)]
        checksum: PathBuf,

        /// Target root (defaults to the checksum file's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Write checksum files for inputs, one per algorithm
    Checksum {
        /// Hash algorithms: sha224, sha256, sha384, sha512, blake3
        #[arg(short, long = "algo", default_value = "sha256", value_delimiter = ',')]
        algos: Vec<Algorithm>,

        /// Output path; its extension is replaced by the algorithm name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Files or directories to hash
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show rollback files written by scans
    Journal {
        /// Cache directory (defaults to MIRROR_CACHE env var)
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// Show only the most recent N rollback files
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = OutputWriter::new(cli.json);

    let result = match cli.command {
        Commands::Scan {
            cache,
            inputs,
            respect_ignore,
        } => resolve_cache(cache)
            .and_then(|cache| cmd_scan(&cache, &inputs, respect_ignore, &output)),
        Commands::Export {
            cache,
            checksum,
            root,
        } => resolve_cache(cache)
            .and_then(|cache| cmd_export(&cache, &checksum, root.as_deref(), &output)),
        Commands::Checksum {
            algos,
            output: out_path,
            inputs,
        } => cmd_checksum(&inputs, out_path.as_deref(), &algos, &output),
        Commands::Journal { cache, count } => {
            resolve_cache(cache).and_then(|cache| cmd_journal(&cache, count, &output))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = result_code(&err);
            tracing::debug!(
                result_code = code,
                "Unexpected error has occurred. Program will exit."
            );
            output.write_error(&err, code);
            ExitCode::from(code)
        }
    }
}

/// Log to stderr. `MIRROR_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Cache directory: CLI arg > MIRROR_CACHE env var.
fn resolve_cache(flag: Option<PathBuf>) -> Result<PathBuf> {
    flag.filter(|p| !p.as_os_str().is_empty())
        .or_else(|| {
            std::env::var_os(CACHE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .with_context(|| format!("Cache directory is not set (use --cache or {})", CACHE_ENV))
}

/// Stable process exit code for an error.
///
/// 1 generic or filesystem, 2 syntax or validation, 3 missing content, 4 conflict.
fn result_code(err: &anyhow::Error) -> u8 {
    let core = err
        .chain()
        .find_map(|e| e.downcast_ref::<mirror_core::Error>());
    match core {
        Some(mirror_core::Error::Syntax { .. } | mirror_core::Error::Validation { .. }) => 2,
        Some(mirror_core::Error::MissingContent { .. }) => 3,
        Some(mirror_core::Error::Conflict { .. }) => 4,
        _ => 1,
    }
}

fn open_mirror(cache: &Path, command: &'static str) -> Result<Mirror> {
    let mirror = Mirror::open(cache)
        .with_context(|| format!("Failed to open cache at {}", cache.display()))?;
    Ok(mirror.with_span(tracing::info_span!("mirror", command)))
}

fn cmd_scan(
    cache: &Path,
    inputs: &[PathBuf],
    respect_ignore: bool,
    output: &OutputWriter,
) -> Result<()> {
    let mirror = open_mirror(cache, "scan")?;
    let options = ScanOptions {
        respect_ignore_files: respect_ignore,
    };

    let report = mirror
        .scan(inputs, options)
        .with_context(|| "Failed to scan inputs")?;

    let data = ScanOutput::new(mirror.store().root().to_path_buf(), report);
    output.write(&data, || data.to_text())
}

fn cmd_export(
    cache: &Path,
    checksum: &Path,
    root: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let mirror = open_mirror(cache, "export")?;

    let report = mirror
        .export(checksum, root)
        .with_context(|| format!("Failed to export {}", checksum.display()))?;

    let data = ExportOutput::from(report);
    output.write(&data, || data.to_text())
}

fn cmd_checksum(
    inputs: &[PathBuf],
    out_path: Option<&Path>,
    algos: &[Algorithm],
    output: &OutputWriter,
) -> Result<()> {
    let span = tracing::info_span!("checksum", command = "create");
    let _enter = span.enter();

    let files = create_checksums(inputs, out_path, algos)
        .with_context(|| "Failed to create checksum files")?;

    let data = ChecksumOutput::new(files);
    output.write(&data, || data.to_text())
}

fn cmd_journal(cache: &Path, count: Option<usize>, output: &OutputWriter) -> Result<()> {
    let mirror = open_mirror(cache, "journal")?;

    let paths = mirror
        .store()
        .journals()
        .with_context(|| "Failed to list rollback files")?;
    let skip = count.map_or(0, |n| paths.len().saturating_sub(n));

    let mut journals = Vec::new();
    for path in paths.into_iter().skip(skip) {
        let records = read_journal(&path)
            .with_context(|| format!("Failed to read rollback file {}", path.display()))?;
        let timestamp = journal_timestamp(&path).unwrap_or_default();
        journals.push(JournalInfo {
            timestamp,
            timestamp_human: format_millis(timestamp),
            records: records.into_iter().map(Into::into).collect(),
            path,
        });
    }

    let data = JournalOutput {
        success: true,
        result_code: 0,
        journals,
    };
    output.write(&data, || data.to_text())
}
