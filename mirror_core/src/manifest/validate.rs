//! Post-parse digest checks.

use super::ChecksumItem;
use crate::error::{Error, Result};
use crate::hash::Algorithm;

/// Check that `hash` is exactly `algorithm.hex_len()` hex digits, either case.
pub fn is_valid_hash(hash: &str, algorithm: Algorithm) -> bool {
    hash.len() == algorithm.hex_len() && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verify every item's hash is a well-formed `algorithm` digest.
///
/// Stops at the first offending item and reports its literal hash.
pub fn validate_items(items: &[ChecksumItem], algorithm: Algorithm) -> Result<()> {
    match items.iter().find(|item| !is_valid_hash(&item.hash, algorithm)) {
        Some(item) => Err(Error::validation(algorithm.label(), item.hash.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(hash: &str) -> ChecksumItem {
        ChecksumItem {
            hash: hash.to_string(),
            binary_mode: false,
            path: "file".to_string(),
        }
    }

    #[test]
    fn test_md5_sized_hash_rejected_for_sha256() {
        let hash = "a3c51dd48bf7fabbbd354bd4e16b0ec1";
        let err = validate_items(&[item(hash)], Algorithm::Sha256).unwrap_err();
        match err {
            Error::Validation { hash: reported, .. } => assert_eq!(reported, hash),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            validate_items(&[item(hash)], Algorithm::Sha256)
                .unwrap_err()
                .to_string(),
            format!("invalid SHA-256 hash '{}'", hash)
        );
    }

    #[test]
    fn test_mixed_case_accepted() {
        let hash = "BA7816BF8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert!(validate_items(&[item(hash)], Algorithm::Sha256).is_ok());
    }

    #[test]
    fn test_first_failure_reported() {
        let good = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        let items = vec![item(good), item("zz"), item("yy")];
        match validate_items(&items, Algorithm::Sha256) {
            Err(Error::Validation { hash, .. }) => assert_eq!(hash, "zz"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_length_follows_algorithm() {
        let sha224 = "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7";
        assert!(is_valid_hash(sha224, Algorithm::Sha224));
        assert!(!is_valid_hash(sha224, Algorithm::Sha256));
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        assert!(validate_items(&[], Algorithm::Sha256).is_ok());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_wrong_length_always_fails(s in "[0-9a-fA-F]{0,63}|[0-9a-fA-F]{65,80}") {
            prop_assert!(!is_valid_hash(&s, Algorithm::Sha256));
        }

        #[test]
        fn prop_any_64_hex_digits_pass(s in "[0-9a-fA-F]{64}") {
            prop_assert!(is_valid_hash(&s, Algorithm::Sha256));
        }
    }
}
