//! Cachet: Content-Addressed Artifact Caching and Change Detection
//!
//! A Merkle-tree based content fingerprinting engine: builds digests for
//! files and directory snapshots, diffs artifact manifests between builds,
//! decides whether a test execution can be skipped, and assembles payloads
//! for bulk upload to a remote cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod digest;
pub mod error;
pub mod logging;
pub mod tree;
