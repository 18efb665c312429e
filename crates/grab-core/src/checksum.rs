//! Streaming content digests (MD5 by default, SHA-256 on request).
//!
//! Input is consumed in fixed-size chunks so memory use does not depend on
//! the size of the resource. Read errors are returned, never swallowed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithm selectable by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// 128-bit MD5.
    #[default]
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            other => anyhow::bail!("unsupported digest algorithm: {}", other),
        }
    }
}

/// Incremental hasher over one of the supported algorithms.
pub enum Hasher {
    Md5(md5::Context),
    Sha256(Sha256),
}

impl Hasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            DigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(data),
            Hasher::Sha256(h) => h.update(data),
        }
    }

    /// Consume the hasher and return the digest as lowercase hex.
    pub fn finish_hex(self) -> String {
        match self {
            Hasher::Md5(ctx) => hex::encode(ctx.compute().0),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

/// Digest everything `reader` yields, reading `BUF_SIZE` bytes at a time.
pub fn digest_reader<R: Read>(mut reader: R, algorithm: DigestAlgorithm) -> io::Result<String> {
    let mut hasher = Hasher::new(algorithm);
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish_hex())
}

/// Digest of a file on disk, as lowercase hex.
pub fn digest_path(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    digest_reader(f, algorithm).with_context(|| format!("read {}", path.display()))
}

/// Case-insensitive comparison of a computed hex digest with a caller-supplied one.
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn digest_bytes(data: &[u8], algorithm: DigestAlgorithm) -> String {
        let mut hasher = Hasher::new(algorithm);
        hasher.update(data);
        hasher.finish_hex()
    }

    #[test]
    fn md5_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = digest_path(f.path(), DigestAlgorithm::Md5).unwrap();
        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn sha256_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = digest_path(f.path(), DigestAlgorithm::Sha256).unwrap();
        assert_eq!(
            digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn md5_known_content() {
        assert_eq!(
            digest_bytes(b"hello\n", DigestAlgorithm::Md5),
            "b1946ac92492d2347c6235b4d2611184"
        );
    }

    #[test]
    fn streaming_matches_in_memory_across_chunk_boundary() {
        let data: Vec<u8> = (0u8..=255).cycle().take(BUF_SIZE * 2 + 17).collect();
        let streamed = digest_reader(&data[..], DigestAlgorithm::Md5).unwrap();
        assert_eq!(streamed, digest_bytes(&data, DigestAlgorithm::Md5));
        // Same content, same digest.
        assert_eq!(streamed, digest_reader(&data[..], DigestAlgorithm::Md5).unwrap());
    }

    #[test]
    fn read_error_is_propagated() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        let err = digest_reader(Broken, DigestAlgorithm::Sha256).unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(digest_path(&dir.path().join("nope"), DigestAlgorithm::Md5).is_err());
    }

    #[test]
    fn algorithm_parse_and_hex_width() {
        assert_eq!("MD5".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Md5);
        assert_eq!(
            "sha256".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha256
        );
        assert!("crc32".parse::<DigestAlgorithm>().is_err());
        assert_eq!(digest_bytes(b"", DigestAlgorithm::Md5).len(), 32);
        assert_eq!(digest_bytes(b"", DigestAlgorithm::Sha256).len(), 64);
    }

    #[test]
    fn digests_match_ignores_case_and_whitespace() {
        assert!(digests_match("abcdef", " ABCDEF\n"));
        assert!(!digests_match("abcdef", "abcdee"));
    }
}
