//! Streaming file digests, several algorithms in one pass.

use crate::error::{Error, Result};
use serde::Serialize;
use sha2::Digest;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Largest read buffer used while hashing.
pub const MAX_BUFFER_SIZE: usize = 32 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Blake3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Blake3,
    ];

    /// Name used on the command line and as checksum file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
            Algorithm::Blake3 => "blake3",
        }
    }

    /// Human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Sha224 => "SHA-224",
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha384 => "SHA-384",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::Blake3 => "BLAKE3",
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
            Algorithm::Blake3 => blake3::OUT_LEN,
        }
    }

    /// Digest size in hex characters.
    pub fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }

    /// Parse a list of names, failing on the first unknown one.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Algorithm>> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }

    fn digester(&self) -> Digester {
        match self {
            Algorithm::Sha224 => Digester::Sha224(sha2::Sha224::new()),
            Algorithm::Sha256 => Digester::Sha256(sha2::Sha256::new()),
            Algorithm::Sha384 => Digester::Sha384(sha2::Sha384::new()),
            Algorithm::Sha512 => Digester::Sha512(sha2::Sha512::new()),
            Algorithm::Blake3 => Digester::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::unsupported_algorithm(s))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running state of one digest.
enum Digester {
    Sha224(sha2::Sha224),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Digester {
    fn finalize(self) -> Vec<u8> {
        match self {
            Digester::Sha224(d) => d.finalize().to_vec(),
            Digester::Sha256(d) => d.finalize().to_vec(),
            Digester::Sha384(d) => d.finalize().to_vec(),
            Digester::Sha512(d) => d.finalize().to_vec(),
            Digester::Blake3(d) => d.finalize().as_bytes().to_vec(),
        }
    }
}

impl Write for Digester {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Digester::Sha224(d) => d.write(buf),
            Digester::Sha256(d) => d.write(buf),
            Digester::Sha384(d) => d.write(buf),
            Digester::Sha512(d) => d.write(buf),
            Digester::Blake3(d) => d.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Digest of one file under one algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashResult {
    pub path: PathBuf,
    pub algorithm: Algorithm,
    /// Bytes read from the source.
    pub size: u64,
    pub digest: Vec<u8>,
}

impl HashResult {
    /// Lowercase hex of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

/// Read buffer size for a source with `remaining` bytes left, if known.
pub fn buffer_size(remaining: Option<u64>) -> usize {
    match remaining {
        Some(n) if n < MAX_BUFFER_SIZE as u64 => (n as usize).max(1),
        _ => MAX_BUFFER_SIZE,
    }
}

/// Stream `reader` through every algorithm in one pass.
///
/// Returns the byte count and one digest per algorithm, in the order given.
pub fn hash_reader<R: Read>(
    mut reader: R,
    algorithms: &[Algorithm],
    remaining: Option<u64>,
) -> Result<(u64, Vec<Vec<u8>>)> {
    let mut digesters: Vec<Digester> = algorithms.iter().map(|a| a.digester()).collect();
    let mut buf = vec![0u8; buffer_size(remaining)];
    let mut written = 0u64;

    loop {
        let nread = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for digester in digesters.iter_mut() {
            let nwrite = digester.write(&buf[..nread])?;
            if nwrite != nread {
                return Err(Error::Io {
                    source: io::Error::other(format!(
                        "read and write data mismatch {} {}",
                        nread, nwrite
                    )),
                });
            }
        }
        written += nread as u64;
    }

    let digests = digesters.into_iter().map(Digester::finalize).collect();
    Ok((written, digests))
}

/// Hash a file with every algorithm in `algorithms`, reading it once.
pub fn hash_file(path: &Path, algorithms: &[Algorithm]) -> Result<Vec<HashResult>> {
    let file = File::open(path).map_err(|e| Error::filesystem("open", path, e))?;
    let remaining = file.metadata().ok().map(|m| m.len());

    let (size, digests) = hash_reader(file, algorithms, remaining)
        .map_err(|e| match e {
            Error::Io { source } => Error::filesystem("read", path, source),
            other => other,
        })?;

    Ok(algorithms
        .iter()
        .zip(digests)
        .map(|(&algorithm, digest)| HashResult {
            path: path.to_path_buf(),
            algorithm,
            size,
            digest,
        })
        .collect())
}

/// Hash a file using algorithm names, rejecting unknown names before opening it.
pub fn hash_file_named<S: AsRef<str>>(path: &Path, names: &[S]) -> Result<Vec<HashResult>> {
    let algorithms = Algorithm::parse_all(names)?;
    hash_file(path, &algorithms)
}

/// Hash a file with a single algorithm.
pub fn hash_file_single(path: &Path, algorithm: Algorithm) -> Result<HashResult> {
    hash_file(path, &[algorithm])?
        .pop()
        .ok_or_else(|| Error::filesystem("hash", path, io::Error::other("no digest produced")))
}

/// SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<HashResult> {
    hash_file_single(path, Algorithm::Sha256)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_sha256_abc() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "abc.txt", b"abc");

        let result = sha256_file(&path).unwrap();
        assert_eq!(result.to_hex(), ABC_SHA256);
        assert_eq!(result.size, 3);
        assert_eq!(result.algorithm, Algorithm::Sha256);
        assert_eq!(result.path, path);
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "empty", b"");

        let result = sha256_file(&path).unwrap();
        assert_eq!(result.to_hex(), EMPTY_SHA256);
        assert_eq!(result.size, 0);
    }

    #[test]
    fn test_multiple_algorithms_single_pass() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "abc.txt", b"abc");

        let results = hash_file_named(&path, &["sha224", "sha256", "sha384", "sha512"]).unwrap();
        let hexes: Vec<String> = results.iter().map(HashResult::to_hex).collect();
        assert_eq!(
            hexes,
            vec![
                "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7",
                ABC_SHA256,
                "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7",
                "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
            ]
        );
        assert!(results.iter().all(|r| r.size == 3));
    }

    #[test]
    fn test_blake3() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "hw.txt", b"hello world");

        let results = hash_file(&path, &[Algorithm::Blake3]).unwrap();
        assert_eq!(
            results[0].to_hex(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_unknown_algorithm_fails_before_io() {
        let temp_dir = TempDir::new().unwrap();
        // The file does not exist; the algorithm error must win.
        let missing = temp_dir.path().join("missing");
        let err = hash_file_named(&missing, &["sha256", "crc99"]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedAlgorithm { ref algorithm } if algorithm == "crc99"
        ));
    }

    #[test]
    fn test_single_digest_of_empty_file_is_full_length() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "empty", b"");

        for algo in Algorithm::ALL {
            let result = hash_file_single(&path, algo).unwrap();
            assert_eq!(result.algorithm, algo);
            assert_eq!(result.digest.len(), algo.digest_len());
        }
    }

    #[test]
    fn test_no_algorithms_yields_no_results() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "abc.txt", b"abc");
        assert!(hash_file(&path, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = sha256_file(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Filesystem { action: "open", .. }));
    }

    #[test]
    fn test_large_file_spans_buffers() {
        let temp_dir = TempDir::new().unwrap();
        let data = vec![b'x'; MAX_BUFFER_SIZE * 3 + 17];
        let path = write_file(&temp_dir, "large", &data);

        let result = sha256_file(&path).unwrap();
        let expected = hex::encode(sha2::Sha256::digest(&data));
        assert_eq!(result.to_hex(), expected);
        assert_eq!(result.size, data.len() as u64);
    }

    #[test]
    fn test_buffer_size() {
        assert_eq!(buffer_size(None), MAX_BUFFER_SIZE);
        assert_eq!(buffer_size(Some(10 * MAX_BUFFER_SIZE as u64)), MAX_BUFFER_SIZE);
        assert_eq!(buffer_size(Some(100)), 100);
        assert_eq!(buffer_size(Some(0)), 1);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_read_error_propagates() {
        let err = hash_reader(FailingReader, &[Algorithm::Sha256], None).unwrap_err();
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_algorithm_names() {
        for algo in Algorithm::ALL {
            assert_eq!(algo.as_str().parse::<Algorithm>().unwrap(), algo);
        }
        assert!("md5".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Sha256.hex_len(), 64);
        assert_eq!(Algorithm::Blake3.hex_len(), 64);
    }

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Streaming digest equals the one-shot digest for any buffer size.
        #[test]
        fn prop_streaming_matches_oneshot(data: Vec<u8>, hint in prop::option::of(0u64..100_000)) {
            let algorithms = [Algorithm::Sha256, Algorithm::Blake3];
            let (size, digests) = hash_reader(&data[..], &algorithms, hint)?;
            prop_assert_eq!(size, data.len() as u64);
            prop_assert_eq!(&digests[0][..], &sha2::Sha256::digest(&data)[..]);
            let blake3_expected = blake3::hash(&data);
            prop_assert_eq!(&digests[1][..], blake3_expected.as_bytes());
        }
    }
}
