//! Artifact manifest parsing and diffing.
//!
//! The manifest wire format is a JSON array of records, one per named
//! artifact, each listing `(digest, path, size)` descriptors for the files
//! the artifact contains:
//!
//! ```json
//! [ { "artifact": "mysuite.zip",
//!     "details": [ { "digest": "...", "path": "...", "size": 123 } ] } ]
//! ```

use crate::error::ManifestError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// One file entry inside an artifact manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFileDescriptor {
    pub digest: String,
    pub path: String,
    pub size: i64,
}

/// The descriptor list for one named artifact, parsed out of a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDetails {
    pub artifact: String,
    pub details: Vec<ArtifactFileDescriptor>,
}

/// Build-id token embedded in artifact names, e.g. `name-8888.zip` or the
/// presubmit form `name-P8888.zip`.
static BUILD_ID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-P?\d+\.zip$").expect("build id pattern is valid"));

fn normalized_name(name: &str) -> String {
    BUILD_ID_TOKEN.replace(name, ".zip").into_owned()
}

impl ArtifactDetails {
    /// Parse a manifest file and return the record matching `artifact_name`.
    ///
    /// Matching is build-id agnostic: `mine-tests-P9999.zip` locates a record
    /// named `mine-tests-8888.zip` for the same logical artifact. Returns
    /// [`ManifestError::ArtifactNotFound`] when the manifest is valid but has
    /// no matching record.
    pub fn parse_file(manifest: &Path, artifact_name: &str) -> Result<ArtifactDetails, ManifestError> {
        let content = fs::read_to_string(manifest).map_err(|source| ManifestError::Io {
            path: manifest.to_path_buf(),
            source,
        })?;
        let records: Vec<ArtifactDetails> =
            serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
                path: manifest.to_path_buf(),
                source,
            })?;
        if let Some(exact) = records.iter().find(|r| r.artifact == artifact_name) {
            return Ok(exact.clone());
        }
        let family = normalized_name(artifact_name);
        records
            .into_iter()
            .find(|r| normalized_name(&r.artifact) == family)
            .ok_or_else(|| ManifestError::ArtifactNotFound(artifact_name.to_string()))
    }

    /// Return every descriptor in `current` whose path is absent from `base`
    /// or present with a different digest.
    ///
    /// The diff is one-directional by design: entries present in `base` but
    /// absent from `current` are never reported. Callers interpret the result
    /// as "files the current execution must account for as changed", and a
    /// deleted file cannot be changed in a retained artifact.
    pub fn diff_contents(
        base: &ArtifactDetails,
        current: &ArtifactDetails,
    ) -> Vec<ArtifactFileDescriptor> {
        let base_digests: HashMap<&str, &str> = base
            .details
            .iter()
            .map(|d| (d.path.as_str(), d.digest.as_str()))
            .collect();
        let diffs: Vec<ArtifactFileDescriptor> = current
            .details
            .iter()
            .filter(|d| base_digests.get(d.path.as_str()) != Some(&d.digest.as_str()))
            .cloned()
            .collect();
        debug!(
            artifact = %current.artifact,
            diffs = diffs.len(),
            "diffed artifact contents against base"
        );
        diffs
    }
}
