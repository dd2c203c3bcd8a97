//! Recursive Merkle tree construction from a directory.

use crate::digest::{self, Digest};
use crate::error::TreeError;
use crate::tree::node::{DirectoryNode, FileNode, SubdirectoryNode};
use crate::tree::MerkleTree;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build a Merkle tree from a root directory.
///
/// The walk is post-order: each subdirectory's digest is computed before it
/// is inserted into its parent as a `(name, digest)` pair. Children are
/// sorted by name inside each node, so the resulting root digest and maps do
/// not depend on the order the OS returned directory entries in.
pub fn build_from_dir(root: &Path) -> Result<MerkleTree, TreeError> {
    if !root.is_dir() {
        return Err(TreeError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let mut digest_to_file = HashMap::new();
    let mut digest_to_subdir = HashMap::new();
    let root_digest = build_directory(root, &mut digest_to_file, &mut digest_to_subdir)?;
    debug!(root = %root.display(), digest = %root_digest, "built merkle tree");
    Ok(MerkleTree::new(root_digest, digest_to_file, digest_to_subdir))
}

fn build_directory(
    dir: &Path,
    digest_to_file: &mut HashMap<Digest, PathBuf>,
    digest_to_subdir: &mut HashMap<Digest, DirectoryNode>,
) -> Result<Digest, TreeError> {
    let mut node = DirectoryNode::new();
    let entries = fs::read_dir(dir).map_err(|source| TreeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| TreeError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        // Follows symlinks, like the rest of the analysis pipeline.
        let metadata = fs::metadata(&path).map_err(|source| TreeError::Io {
            path: path.clone(),
            source,
        })?;
        if metadata.is_dir() {
            let child_digest = build_directory(&path, digest_to_file, digest_to_subdir)?;
            node.insert_subdirectory(SubdirectoryNode {
                name,
                digest: child_digest,
            });
        } else {
            let file_digest = digest::compute_file(&path)?;
            node.insert_file(FileNode {
                name,
                digest: file_digest.clone(),
                is_executable: is_executable(&metadata),
            });
            digest_to_file.insert(file_digest, path);
        }
    }
    let node_digest = digest::compute_directory(&node);
    digest_to_subdir.insert(node_digest.clone(), node);
    Ok(node_digest)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
