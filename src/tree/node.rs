//! Filesystem node types.
//!
//! A directory node lists its file and subdirectory children sorted by name,
//! so two directories with the same content hash identically regardless of
//! the order the OS enumerated their entries in.

use crate::digest::Digest;
use serde::Serialize;

/// One file within a directory node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub name: String,
    pub digest: Digest,
    pub is_executable: bool,
}

/// A named reference to a child directory, by the digest of its node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubdirectoryNode {
    pub name: String,
    pub digest: Digest,
}

/// Directory node: sorted file children plus sorted subdirectory references.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryNode {
    files: Vec<FileNode>,
    subdirectories: Vec<SubdirectoryNode>,
}

impl DirectoryNode {
    pub fn new() -> Self {
        DirectoryNode::default()
    }

    /// Insert a file child, keeping the file list sorted by name.
    pub fn insert_file(&mut self, node: FileNode) {
        let index = match self
            .files
            .binary_search_by(|existing| existing.name.as_str().cmp(&node.name))
        {
            Ok(i) | Err(i) => i,
        };
        self.files.insert(index, node);
    }

    /// Insert a subdirectory reference, keeping the list sorted by name.
    pub fn insert_subdirectory(&mut self, node: SubdirectoryNode) {
        let index = match self
            .subdirectories
            .binary_search_by(|existing| existing.name.as_str().cmp(&node.name))
        {
            Ok(i) | Err(i) => i,
        };
        self.subdirectories.insert(index, node);
    }

    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    pub fn subdirectories(&self) -> &[SubdirectoryNode] {
        &self.subdirectories
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.subdirectories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest;

    fn file(name: &str, content: &[u8]) -> FileNode {
        FileNode {
            name: name.to_string(),
            digest: digest::compute_bytes(content),
            is_executable: false,
        }
    }

    #[test]
    fn test_files_sorted_regardless_of_insert_order() {
        let mut forward = DirectoryNode::new();
        forward.insert_file(file("a.txt", b"a"));
        forward.insert_file(file("b.txt", b"b"));
        forward.insert_file(file("c.txt", b"c"));

        let mut reverse = DirectoryNode::new();
        reverse.insert_file(file("c.txt", b"c"));
        reverse.insert_file(file("a.txt", b"a"));
        reverse.insert_file(file("b.txt", b"b"));

        assert_eq!(forward, reverse);
        assert_eq!(
            digest::compute_directory(&forward),
            digest::compute_directory(&reverse)
        );
    }

    #[test]
    fn test_subdirectories_sorted_regardless_of_insert_order() {
        let child = digest::compute_bytes(b"child");
        let mut forward = DirectoryNode::new();
        forward.insert_subdirectory(SubdirectoryNode {
            name: "x".to_string(),
            digest: child.clone(),
        });
        forward.insert_subdirectory(SubdirectoryNode {
            name: "y".to_string(),
            digest: child.clone(),
        });

        let mut reverse = DirectoryNode::new();
        reverse.insert_subdirectory(SubdirectoryNode {
            name: "y".to_string(),
            digest: child.clone(),
        });
        reverse.insert_subdirectory(SubdirectoryNode {
            name: "x".to_string(),
            digest: child,
        });

        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_empty_node_has_stable_digest() {
        let a = DirectoryNode::new();
        let b = DirectoryNode::new();
        assert_eq!(
            digest::compute_directory(&a),
            digest::compute_directory(&b)
        );
    }
}
