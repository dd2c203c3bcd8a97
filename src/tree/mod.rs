//! Filesystem Merkle Tree
//!
//! Represents a directory snapshot as a Merkle tree: each directory node's
//! digest is derived from its children's digests, so two snapshots compare
//! by a single root digest. Leaf files and directory nodes are recorded in
//! content-addressed maps, which deduplicates identical content anywhere in
//! the tree.

pub mod builder;
pub mod node;

pub use builder::build_from_dir;
pub use node::{DirectoryNode, FileNode, SubdirectoryNode};

use crate::digest::Digest;
use std::collections::HashMap;
use std::path::PathBuf;

/// Result of a single build pass over a root directory. Immutable after
/// construction.
#[derive(Debug)]
pub struct MerkleTree {
    root_digest: Digest,
    digest_to_file: HashMap<Digest, PathBuf>,
    digest_to_subdir: HashMap<Digest, DirectoryNode>,
}

impl MerkleTree {
    pub(crate) fn new(
        root_digest: Digest,
        digest_to_file: HashMap<Digest, PathBuf>,
        digest_to_subdir: HashMap<Digest, DirectoryNode>,
    ) -> Self {
        MerkleTree {
            root_digest,
            digest_to_file,
            digest_to_subdir,
        }
    }

    /// Digest of the walked root directory.
    pub fn root_digest(&self) -> &Digest {
        &self.root_digest
    }

    /// Every leaf file, keyed by content digest.
    pub fn digest_to_file(&self) -> &HashMap<Digest, PathBuf> {
        &self.digest_to_file
    }

    /// Every directory node (root included), keyed by node digest.
    pub fn digest_to_subdir(&self) -> &HashMap<Digest, DirectoryNode> {
        &self.digest_to_subdir
    }
}
