//! Canonical content digests.
//!
//! Every identity in the cache is a [`Digest`]: the SHA-256 of the content
//! paired with its length in bytes. Structured nodes are digested over a
//! canonical serialization (fixed field order, children sorted by name) so
//! that logically-equal structures hash to identical digests.

use crate::error::TreeError;
use crate::tree::DirectoryNode;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use sha2::Sha256;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// Content fingerprint: SHA-256 hex hash plus byte length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    pub hash: String,
    pub size_bytes: i64,
}

impl Digest {
    pub fn new(hash: impl Into<String>, size_bytes: i64) -> Self {
        Digest {
            hash: hash.into(),
            size_bytes,
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hash, self.size_bytes)
    }
}

/// Compute the digest of an in-memory byte buffer.
pub fn compute_bytes(content: &[u8]) -> Digest {
    let hash = Sha256::digest(content);
    Digest {
        hash: hex::encode(hash),
        size_bytes: content.len() as i64,
    }
}

/// Compute the digest of a file, streaming its content through the hasher.
pub fn compute_file(path: &Path) -> Result<Digest, TreeError> {
    let mut file = File::open(path).map_err(|source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    let size = io::copy(&mut file, &mut hasher).map_err(|source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Digest {
        hash: hex::encode(hasher.finalize()),
        size_bytes: size as i64,
    })
}

/// Compute the digest of a directory node over its canonical serialization.
pub fn compute_directory(node: &DirectoryNode) -> Digest {
    compute_canonical(node)
}

/// Digest a serializable value through its canonical JSON form.
///
/// Field order is fixed by the type definition and child collections are kept
/// sorted by their owners, so logically-equal values serialize byte-identically.
pub fn compute_canonical<T: Serialize>(value: &T) -> Digest {
    let bytes = serde_json::to_vec(value).expect("canonical serialization is infallible");
    compute_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_compute_bytes_empty() {
        let digest = compute_bytes(b"");
        assert_eq!(
            digest.hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(digest.size_bytes, 0);
    }

    #[test]
    fn test_compute_bytes_deterministic() {
        let a = compute_bytes(b"some content");
        let b = compute_bytes(b"some content");
        assert_eq!(a, b);
        assert_eq!(a.size_bytes, 12);
    }

    #[test]
    fn test_compute_file_matches_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"file content").unwrap();
        let from_file = compute_file(file.path()).unwrap();
        let from_bytes = compute_bytes(b"file content");
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn test_compute_file_missing_is_io_error() {
        let result = compute_file(Path::new("/nonexistent/path/to/file"));
        assert!(matches!(result, Err(TreeError::Io { .. })));
    }

    #[test]
    fn test_display_includes_size() {
        let digest = Digest::new("abcd", 42);
        assert_eq!(digest.to_string(), "abcd/42");
    }
}
