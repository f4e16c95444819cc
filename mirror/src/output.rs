//! Output formatting for CLI commands.
//!
//! Every command result is printed either as text or as one pretty JSON document.

use anyhow::Result;
use mirror_core::{
    Algorithm, ChecksumFile, ExportReport, ExportedFile, JournalEntry, ScanReport, ScannedFile,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write `data` as JSON, or the text produced by `text_fn`.
    ///
    /// `text_fn` is only called in text mode.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        let mut out = self.stdout.lock();
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(out, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(out, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error to stderr, including its context chain.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        let message = format!("{:#}", error);
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: message,
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {}", message);
            }
        }
    }
}

/// Millisecond timestamp rendered as RFC 3339 UTC.
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for `scan` command.
#[derive(Debug, Serialize)]
pub struct ScanOutput {
    pub success: bool,
    pub result_code: u8,
    pub cache: PathBuf,
    pub journal: PathBuf,
    pub created: usize,
    pub skipped: usize,
    pub files: Vec<ScannedFile>,
}

impl ScanOutput {
    pub fn new(cache: PathBuf, report: ScanReport) -> Self {
        Self {
            success: true,
            result_code: 0,
            cache,
            created: report.created(),
            skipped: report.skipped(),
            journal: report.journal,
            files: report.files,
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for file in &self.files {
            let status = if file.created { "cached" } else { "skipped" };
            text.push_str(&format!("{} {} {}\n", status, file.hash, file.source.display()));
        }
        text.push_str(&format!(
            "{} cached, {} skipped. Rollback file: {}\n",
            self.created,
            self.skipped,
            self.journal.display()
        ));
        text
    }
}

/// Output for `export` command.
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub success: bool,
    pub result_code: u8,
    pub target_root: PathBuf,
    pub files: Vec<ExportedFile>,
}

impl From<ExportReport> for ExportOutput {
    fn from(report: ExportReport) -> Self {
        Self {
            success: true,
            result_code: 0,
            target_root: report.target_root,
            files: report.files,
        }
    }
}

impl ExportOutput {
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for file in &self.files {
            text.push_str(&format!("{} {}\n", file.hash, file.destination.display()));
        }
        text.push_str(&format!(
            "Exported {} file(s) to {}\n",
            self.files.len(),
            self.target_root.display()
        ));
        text
    }
}

/// Output for `checksum` command.
#[derive(Debug, Serialize)]
pub struct ChecksumOutput {
    pub success: bool,
    pub result_code: u8,
    pub algorithms: Vec<Algorithm>,
    pub files: Vec<ChecksumFile>,
}

impl ChecksumOutput {
    pub fn new(files: Vec<ChecksumFile>) -> Self {
        Self {
            success: true,
            result_code: 0,
            algorithms: files.iter().map(|f| f.algorithm).collect(),
            files,
        }
    }

    pub fn to_text(&self) -> String {
        self.files
            .iter()
            .map(|f| format!("{} {} line(s) {}\n", f.algorithm, f.line_count, f.path.display()))
            .collect()
    }
}

/// One record of a rollback journal.
#[derive(Debug, Clone, Serialize)]
pub struct JournalRecordInfo {
    pub source: String,
    pub hash: String,
}

impl From<JournalEntry> for JournalRecordInfo {
    fn from(entry: JournalEntry) -> Self {
        Self {
            source: entry.source,
            hash: entry.hash,
        }
    }
}

/// One rollback journal file.
#[derive(Debug, Clone, Serialize)]
pub struct JournalInfo {
    pub path: PathBuf,
    pub timestamp: i64,
    pub timestamp_human: String,
    pub records: Vec<JournalRecordInfo>,
}

/// Output for `journal` command.
#[derive(Debug, Serialize)]
pub struct JournalOutput {
    pub success: bool,
    pub result_code: u8,
    pub journals: Vec<JournalInfo>,
}

impl JournalOutput {
    pub fn to_text(&self) -> String {
        if self.journals.is_empty() {
            return "No rollback files\n".to_string();
        }
        let mut text = String::new();
        for journal in &self.journals {
            text.push_str(&format!(
                "{} {} ({} record(s))\n",
                journal.timestamp_human,
                journal.path.display(),
                journal.records.len()
            ));
            for record in &journal.records {
                text.push_str(&format!("  {} {}\n", record.hash, record.source));
            }
        }
        text
    }
}
