//! Upload payload assembly.
//!
//! Collects digest-to-content associations to be pushed to a remote cache in
//! one request. The manifest is a deduplicating, digest-keyed set: inserting
//! a second entry for a digest already present keeps a single entry, since
//! digest identity implies content identity. No network I/O happens here;
//! transmission belongs to the [`CacheClient`] collaborator.
//!
//! [`CacheClient`]: crate::cache::CacheClient

use crate::digest::Digest;
use std::collections::HashMap;
use std::path::PathBuf;

/// Immutable digest-keyed payload for a bulk cache upload.
#[derive(Debug, Default)]
pub struct UploadManifest {
    digest_to_file: HashMap<Digest, PathBuf>,
    digest_to_blob: HashMap<Digest, Vec<u8>>,
}

impl UploadManifest {
    pub fn builder() -> UploadManifestBuilder {
        UploadManifestBuilder::default()
    }

    pub fn digest_to_file(&self) -> &HashMap<Digest, PathBuf> {
        &self.digest_to_file
    }

    pub fn digest_to_blob(&self) -> &HashMap<Digest, Vec<u8>> {
        &self.digest_to_blob
    }

    pub fn is_empty(&self) -> bool {
        self.digest_to_file.is_empty() && self.digest_to_blob.is_empty()
    }
}

/// Additive builder for [`UploadManifest`].
#[derive(Debug, Default)]
pub struct UploadManifestBuilder {
    digest_to_file: HashMap<Digest, PathBuf>,
    digest_to_blob: HashMap<Digest, Vec<u8>>,
}

impl UploadManifestBuilder {
    pub fn add_file(mut self, digest: Digest, file: impl Into<PathBuf>) -> Self {
        self.digest_to_file.insert(digest, file.into());
        self
    }

    pub fn add_files(mut self, files: impl IntoIterator<Item = (Digest, PathBuf)>) -> Self {
        self.digest_to_file.extend(files);
        self
    }

    pub fn add_blob(mut self, digest: Digest, blob: impl Into<Vec<u8>>) -> Self {
        self.digest_to_blob.insert(digest, blob.into());
        self
    }

    pub fn add_blobs(mut self, blobs: impl IntoIterator<Item = (Digest, Vec<u8>)>) -> Self {
        self.digest_to_blob.extend(blobs);
        self
    }

    pub fn build(self) -> UploadManifest {
        UploadManifest {
            digest_to_file: self.digest_to_file,
            digest_to_blob: self.digest_to_blob,
        }
    }
}
