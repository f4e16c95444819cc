//! Error types for mirror_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using mirror_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing manifests or operating on the content store.
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest grammar violation.
    ///
    /// `actual` is the literal exactly as the lexer produced it, control characters included.
    #[error("invalid token. expected {expected} actual '{actual}'")]
    Syntax { expected: String, actual: String },

    /// A well-formed manifest line carries a hash that is not a valid digest.
    #[error("invalid {algorithm} hash '{hash}'")]
    Validation { algorithm: String, hash: String },

    /// Export references digests that are not present in the cache.
    #[error("missing {} item(s) in cache: {}", .hashes.len(), .hashes.join(", "))]
    MissingContent { hashes: Vec<String> },

    /// I/O error without a more specific path.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// I/O error tied to a specific path (open, read, link, mkdir).
    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A target path collides with an existing plain file.
    #[error("a file with the same name as {} already exists", .path.display())]
    Conflict { path: PathBuf },

    /// Cache directory is missing or not a directory.
    #[error("Invalid cache at {}: {reason}", .path.display())]
    InvalidStore { path: PathBuf, reason: String },

    /// Caller supplied arguments that cannot be acted upon.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Unsupported digest algorithm name.
    #[error("unsupported hash algorithm: '{algorithm}'")]
    UnsupportedAlgorithm { algorithm: String },

    /// Journal (de)serialization failure.
    #[error("Journal encoding error: {source}")]
    Journal {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a Syntax error.
    pub fn syntax(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::Syntax {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a Validation error.
    pub fn validation(algorithm: impl Into<String>, hash: impl Into<String>) -> Self {
        Error::Validation {
            algorithm: algorithm.into(),
            hash: hash.into(),
        }
    }

    /// Create a MissingContent error.
    pub fn missing_content(hashes: Vec<String>) -> Self {
        Error::MissingContent { hashes }
    }

    /// Create a Filesystem error.
    pub fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Create a Conflict error.
    pub fn conflict(path: impl Into<PathBuf>) -> Self {
        Error::Conflict { path: path.into() }
    }

    /// Create an InvalidStore error.
    pub fn invalid_store(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidStore {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedAlgorithm error.
    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }
}

// Additional From implementations for external error types

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}

impl From<ignore::Error> for Error {
    fn from(err: ignore::Error) -> Self {
        // ignore::Error can wrap an io::Error or be a path error
        match err.io_error() {
            Some(io_err) => Error::Io {
                source: std::io::Error::new(io_err.kind(), io_err.to_string()),
            },
            None => Error::Io {
                source: std::io::Error::other(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message_keeps_control_characters() {
        let err = Error::syntax("whitespace", "\0");
        assert_eq!(err.to_string(), "invalid token. expected whitespace actual '\0'");

        let err = Error::syntax("whitespace", "\n");
        assert_eq!(err.to_string(), "invalid token. expected whitespace actual '\n'");
    }

    #[test]
    fn test_missing_content_lists_every_hash() {
        let err = Error::missing_content(vec!["aa".to_string(), "bb".to_string()]);
        assert_eq!(err.to_string(), "missing 2 item(s) in cache: aa, bb");
    }
}
