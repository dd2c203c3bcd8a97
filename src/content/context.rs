//! Analysis contexts.
//!
//! A [`ContentAnalysisContext`] is one unit of change-detection work: a named
//! artifact entry, the manifest pair describing its base and current builds,
//! and the method used to analyze it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// How a context's artifact is analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMethod {
    /// Compare an extracted test-artifacts directory file by file.
    File,
    /// Compare aggregate device image digests.
    DeviceImage,
    /// Compare per-module subtrees under a suite's testcases root.
    ModuleXts,
}

/// The manifest pair for an analysis: base build vs current build.
///
/// May own temporary manifest files, which are removed by [`clean`] — and by
/// `Drop`, so every exit path releases them.
///
/// [`clean`]: ContentInformation::clean
#[derive(Debug)]
pub struct ContentInformation {
    base_manifest: PathBuf,
    base_build_id: String,
    current_manifest: PathBuf,
    current_build_id: String,
    owns_manifests: bool,
}

impl ContentInformation {
    /// Context over caller-managed manifest files.
    pub fn new(
        base_manifest: impl Into<PathBuf>,
        base_build_id: impl Into<String>,
        current_manifest: impl Into<PathBuf>,
        current_build_id: impl Into<String>,
    ) -> Self {
        ContentInformation {
            base_manifest: base_manifest.into(),
            base_build_id: base_build_id.into(),
            current_manifest: current_manifest.into(),
            current_build_id: current_build_id.into(),
            owns_manifests: false,
        }
    }

    /// Context that owns its manifest files: `clean()` deletes them.
    pub fn owning(
        base_manifest: impl Into<PathBuf>,
        base_build_id: impl Into<String>,
        current_manifest: impl Into<PathBuf>,
        current_build_id: impl Into<String>,
    ) -> Self {
        let mut information = ContentInformation::new(
            base_manifest,
            base_build_id,
            current_manifest,
            current_build_id,
        );
        information.owns_manifests = true;
        information
    }

    pub fn base_manifest(&self) -> &Path {
        &self.base_manifest
    }

    pub fn base_build_id(&self) -> &str {
        &self.base_build_id
    }

    pub fn current_manifest(&self) -> &Path {
        &self.current_manifest
    }

    pub fn current_build_id(&self) -> &str {
        &self.current_build_id
    }

    /// Delete owned manifest files. Idempotent.
    pub fn clean(&mut self) {
        if !self.owns_manifests {
            return;
        }
        self.owns_manifests = false;
        for path in [&self.base_manifest, &self.current_manifest] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to remove temp manifest");
                }
            }
        }
    }
}

impl Drop for ContentInformation {
    fn drop(&mut self) {
        self.clean();
    }
}

/// One unit of change-detection work.
#[derive(Debug)]
pub struct ContentAnalysisContext {
    content_entry: String,
    information: ContentInformation,
    method: AnalysisMethod,
    ignored_changes: HashSet<String>,
    abort_reason: Option<String>,
}

impl ContentAnalysisContext {
    pub fn new(
        content_entry: impl Into<String>,
        information: ContentInformation,
        method: AnalysisMethod,
    ) -> Self {
        ContentAnalysisContext {
            content_entry: content_entry.into(),
            information,
            method,
            ignored_changes: HashSet::new(),
            abort_reason: None,
        }
    }

    /// Paths whose changes are ignored during analysis.
    pub fn with_ignored_changes(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.ignored_changes.extend(paths);
        self
    }

    /// Mark the analysis as invalid; the analyzer treats an aborted context
    /// as changed.
    pub fn abort_analysis(&mut self, reason: impl Into<String>) {
        self.abort_reason = Some(reason.into());
    }

    pub fn content_entry(&self) -> &str {
        &self.content_entry
    }

    pub fn information(&self) -> &ContentInformation {
        &self.information
    }

    pub fn information_mut(&mut self) -> &mut ContentInformation {
        &mut self.information
    }

    pub fn method(&self) -> AnalysisMethod {
        self.method
    }

    pub fn ignored_changes(&self) -> &HashSet<String> {
        &self.ignored_changes
    }

    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.as_deref()
    }
}
