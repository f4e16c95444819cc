//! Checksum manifests in `sha256sum`-compatible text form.
//!
//! One item per line: `<hex digest> [*]<path>`, terminated by LF or CRLF. The
//! terminator after the last line is optional.

mod lexer;
mod parser;
mod validate;

pub use lexer::{EOF_LITERAL, Lexer, Token, TokenKind};
pub use parser::Parser;
pub use validate::{is_valid_hash, validate_items};

use crate::error::{Error, Result};
use crate::hash::Algorithm;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumItem {
    /// Hex digest exactly as written. Not validated by the parser.
    pub hash: String,
    /// `*` marker was present before the path.
    pub binary_mode: bool,
    /// Literal remainder of the line; may contain spaces.
    pub path: String,
}

impl ChecksumItem {
    pub fn new(hash: impl Into<String>, binary_mode: bool, path: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            binary_mode,
            path: path.into(),
        }
    }
}

impl fmt::Display for ChecksumItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.binary_mode { "*" } else { "" };
        write!(f, "{} {}{}", self.hash, marker, self.path)
    }
}

/// Parse manifest text without checking the hashes.
pub fn parse_manifest(input: &str) -> Result<Vec<ChecksumItem>> {
    Parser::new(input).parse()
}

/// Parse manifest text and require every hash to be an `algorithm` digest.
///
/// Nothing is returned unless the whole manifest both parses and validates.
pub fn parse_and_validate(input: &str, algorithm: Algorithm) -> Result<Vec<ChecksumItem>> {
    let items = parse_manifest(input)?;
    validate_items(&items, algorithm)?;
    Ok(items)
}

/// Parse a SHA-256 manifest.
pub fn parse_sha256(input: &str) -> Result<Vec<ChecksumItem>> {
    parse_and_validate(input, Algorithm::Sha256)
}

/// Read, parse and validate a manifest file.
pub fn read_manifest(path: &Path, algorithm: Algorithm) -> Result<Vec<ChecksumItem>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| Error::filesystem("read", path, e))?;
    parse_and_validate(&content, algorithm)
}

/// Render items as manifest text, one LF-terminated line each.
pub fn write_manifest(items: &[ChecksumItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&item.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_display() {
        let text = ChecksumItem::new(ABC_SHA256, false, "a b.txt").to_string();
        assert_eq!(text, format!("{} a b.txt", ABC_SHA256));

        let binary = ChecksumItem::new(ABC_SHA256, true, "a.bin").to_string();
        assert_eq!(binary, format!("{} *a.bin", ABC_SHA256));
    }

    #[test]
    fn test_parse_sha256_rejects_short_hash() {
        let err = parse_sha256("a3c51dd48bf7fabbbd354bd4e16b0ec1 go.mod").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_parse_sha256_syntax_first() {
        let err = parse_sha256("a3c51dd48bf7fabbbd354bd4e16b0ec1").unwrap_err();
        assert!(err.to_string().contains("expected whitespace"));
    }

    #[test]
    fn test_read_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("files.sha256");
        std::fs::write(&path, format!("{} *dir/x.txt\r\n", ABC_SHA256)).unwrap();

        let items = read_manifest(&path, Algorithm::Sha256).unwrap();
        assert_eq!(items, vec![ChecksumItem::new(ABC_SHA256, true, "dir/x.txt")]);
    }

    #[test]
    fn test_read_manifest_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_manifest(&temp_dir.path().join("nope"), Algorithm::Sha256).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    use proptest::prelude::*;

    fn arb_item() -> impl Strategy<Value = ChecksumItem> {
        (
            "[0-9a-fA-F]{64}",
            any::<bool>(),
            "[A-Za-z0-9._/-]{1,12}([ \t]{1,2}[A-Za-z0-9._/-]{1,12}){0,3}",
        )
            .prop_map(|(hash, binary_mode, path)| ChecksumItem {
                hash,
                binary_mode,
                path,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Serializing then parsing yields the same items.
        #[test]
        fn prop_manifest_roundtrip(items in prop::collection::vec(arb_item(), 0..8)) {
            let text = write_manifest(&items);
            let parsed = parse_sha256(&text)?;
            prop_assert_eq!(parsed, items);
        }

        /// CRLF terminators parse the same as LF.
        #[test]
        fn prop_crlf_equivalent(items in prop::collection::vec(arb_item(), 1..5)) {
            let lf = write_manifest(&items);
            let crlf = lf.replace('\n', "\r\n");
            prop_assert_eq!(parse_manifest(&crlf)?, parse_manifest(&lf)?);
        }
    }
}
