//! Content analyzer: decides, per context, whether relevant files changed.
//!
//! Dispatches each [`ContentAnalysisContext`] on its [`AnalysisMethod`]. Any
//! failure to analyze a context (missing root, unreadable or malformed
//! manifest, walk error, aborted context) is recorded as an analysis failure,
//! which forces the overall result to "changed": over-reporting costs a
//! redundant test run, under-reporting a false skip.

use crate::content::artifact_details::{ArtifactDetails, ArtifactFileDescriptor};
use crate::content::context::{AnalysisMethod, ContentAnalysisContext};
use crate::content::device_tree::{self, ManifestSide};
use crate::content::results::ContentAnalysisResults;
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Runs change detection over a set of analysis contexts.
pub struct ContentAnalyzer {
    contexts: Vec<ContentAnalysisContext>,
    root_dir: Option<PathBuf>,
    discovered_modules: Vec<String>,
}

impl ContentAnalyzer {
    pub fn new(contexts: Vec<ContentAnalysisContext>) -> Self {
        ContentAnalyzer {
            contexts,
            root_dir: None,
            discovered_modules: Vec::new(),
        }
    }

    /// Extracted test-artifacts root (FILE) or suite root (MODULE_XTS).
    pub fn with_root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root.into());
        self
    }

    /// Restrict MODULE_XTS analysis to a discovery set of module names.
    /// An empty set means unrestricted.
    pub fn with_discovered_modules(mut self, modules: impl IntoIterator<Item = String>) -> Self {
        self.discovered_modules.extend(modules);
        self
    }

    /// Analyze every context and aggregate the outcome.
    pub fn evaluate(&self) -> ContentAnalysisResults {
        let mut results = ContentAnalysisResults::new();
        for context in &self.contexts {
            if let Some(reason) = context.abort_reason() {
                warn!(
                    artifact = context.content_entry(),
                    reason, "analysis was aborted"
                );
                results.add_analysis_failure();
                continue;
            }
            let outcome = match context.method() {
                AnalysisMethod::File => self.file_analysis(context, &mut results),
                AnalysisMethod::ModuleXts => self.xts_analysis(context, &mut results),
                AnalysisMethod::DeviceImage => self.device_image_analysis(context, &mut results),
            };
            if let Err(e) = outcome {
                warn!(
                    artifact = context.content_entry(),
                    error = format!("{e:#}"),
                    "analysis failed, assuming content changed"
                );
                results.add_analysis_failure();
            }
        }
        results
    }

    /// Compare every file under the extracted root against the diff set.
    fn file_analysis(
        &self,
        context: &ContentAnalysisContext,
        results: &mut ContentAnalysisResults,
    ) -> Result<()> {
        let root = self
            .root_dir
            .as_deref()
            .ok_or_else(|| anyhow!("FILE analysis requires a root directory"))?;
        let diff_paths = self.analyze_content_diff(context)?;
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.context("walking extracted artifacts root")?;
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .context("relativizing walked path")?
                .to_string_lossy()
                .into_owned();
            if diff_paths.contains(&relative) {
                debug!(path = %relative, "file has changed");
                results.add_modified_file();
            } else {
                results.add_unchanged_file();
            }
        }
        Ok(())
    }

    /// Map diffs onto per-module subtrees under `<root>/testcases/`.
    fn xts_analysis(
        &self,
        context: &ContentAnalysisContext,
        results: &mut ContentAnalysisResults,
    ) -> Result<()> {
        let root = self
            .root_dir
            .as_deref()
            .ok_or_else(|| anyhow!("MODULE_XTS analysis requires a root directory"))?;
        let diff_paths = self.analyze_content_diff(context)?;
        let root_package = context.content_entry().trim_end_matches(".zip").to_string();

        // Changes in the shared tools folder affect every module. version.txt
        // changes on every build and carries no signal.
        let tools_prefix = format!("{root_package}/tools/");
        let version_file = format!("{root_package}/tools/version.txt");
        let common_diff: HashSet<&String> = diff_paths
            .iter()
            .filter(|p| p.starts_with(&tools_prefix) && **p != version_file)
            .collect();
        results.add_modified_shared_folder(common_diff.len() as u64);
        if !common_diff.is_empty() {
            debug!(?common_diff, "tools folder has diffs");
        }

        let testcases_root = find_testcases_dir(root)
            .ok_or_else(|| anyhow!("no testcases directory under {}", root.display()))?;
        let entries = fs::read_dir(&testcases_root).context("listing testcases root")?;
        for entry in entries {
            let entry = entry.context("listing testcases root")?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() {
                if !self.discovered_modules.is_empty()
                    && !self.discovered_modules.contains(&name)
                {
                    continue;
                }
                let module_prefix = format!("{root_package}/testcases/{name}/");
                if diff_paths.iter().any(|p| p.starts_with(&module_prefix)) {
                    debug!(module = %name, "module directory has changed");
                    results.add_modified_module();
                } else {
                    debug!(module = %name, "module directory is unchanged");
                    results.add_unchanged_module(name);
                }
            } else {
                let file_path = format!("{root_package}/testcases/{name}");
                if diff_paths.contains(&file_path) {
                    results.add_modified_file();
                } else {
                    results.add_unchanged_file();
                }
            }
        }
        Ok(())
    }

    /// Compare the aggregate device footprint digests of both sides.
    fn device_image_analysis(
        &self,
        context: &ContentAnalysisContext,
        results: &mut ContentAnalysisResults,
    ) -> Result<()> {
        let base = device_tree::build_from_context(context, ManifestSide::Base)?;
        let current = device_tree::build_from_context(context, ManifestSide::Current)?;
        if base != current {
            debug!(
                artifact = context.content_entry(),
                "device image has changed"
            );
            results.add_device_image_changes(1);
        } else {
            debug!(
                artifact = context.content_entry(),
                "device image is unchanged"
            );
        }
        Ok(())
    }

    /// Diff base vs current manifests for the context's artifact, dropping
    /// ignored paths.
    fn analyze_content_diff(&self, context: &ContentAnalysisContext) -> Result<HashSet<String>> {
        let information = context.information();
        let entry = context.content_entry();
        let base = ArtifactDetails::parse_file(information.base_manifest(), entry)?;
        let current = ArtifactDetails::parse_file(information.current_manifest(), entry)?;
        let diffs: Vec<ArtifactFileDescriptor> = ArtifactDetails::diff_contents(&base, &current)
            .into_iter()
            .filter(|d| !context.ignored_changes().contains(&d.path))
            .collect();
        debug!(
            artifact = entry,
            diffs = diffs.len(),
            "analyzed content diff with base"
        );
        Ok(diffs.into_iter().map(|d| d.path).collect())
    }
}

/// Locate the first directory named `testcases` under `root` (root included).
fn find_testcases_dir(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_dir() && e.file_name() == "testcases")
        .map(|e| e.into_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::context::ContentInformation;
    use std::path::PathBuf;

    fn manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const BASE: &str = r#"[
      { "artifact": "android-cts.zip", "details": [
        { "digest": "aaaa", "path": "android-cts/testcases/module1/someapk.apk", "size": 8542 },
        { "digest": "bbbb", "path": "android-cts/testcases/module2/otherfile.xml", "size": 762 }
      ] }
    ]"#;

    const CURRENT: &str = r#"[
      { "artifact": "android-cts.zip", "details": [
        { "digest": "8888", "path": "android-cts/testcases/module1/someapk.apk", "size": 8542 },
        { "digest": "bbbb", "path": "android-cts/testcases/module2/otherfile.xml", "size": 762 }
      ] }
    ]"#;

    fn xts_fixture(dir: &Path) -> (PathBuf, ContentAnalysisContext) {
        let suite_root = dir.join("android-cts");
        fs::create_dir_all(suite_root.join("testcases/module1")).unwrap();
        fs::write(
            suite_root.join("testcases/module1/someapk.apk"),
            b"apk",
        )
        .unwrap();
        fs::create_dir_all(suite_root.join("testcases/module2")).unwrap();
        fs::write(
            suite_root.join("testcases/module2/otherfile.xml"),
            b"xml",
        )
        .unwrap();
        let information = ContentInformation::new(
            manifest(dir, "base.json", BASE),
            "6777",
            manifest(dir, "current.json", CURRENT),
            "P8888",
        );
        let context =
            ContentAnalysisContext::new("android-cts.zip", information, AnalysisMethod::ModuleXts);
        (suite_root, context)
    }

    #[test]
    fn test_xts_change_in_module1_detected() {
        let temp = tempfile::tempdir().unwrap();
        let (suite_root, context) = xts_fixture(temp.path());
        let results = ContentAnalyzer::new(vec![context])
            .with_root_dir(suite_root)
            .evaluate();
        assert!(results.has_any_tests_change());
        assert!(results.unchanged_modules().contains("module2"));
        assert!(!results.unchanged_modules().contains("module1"));
    }

    #[test]
    fn test_xts_discovery_set_restricts_analysis() {
        let temp = tempfile::tempdir().unwrap();
        let (suite_root, context) = xts_fixture(temp.path());
        // Only module2 is considered and it did not change.
        let results = ContentAnalyzer::new(vec![context])
            .with_root_dir(suite_root)
            .with_discovered_modules(["module2".to_string()])
            .evaluate();
        assert!(!results.has_any_tests_change());
        assert!(results.unchanged_modules().contains("module2"));
    }

    #[test]
    fn test_aborted_context_assumes_changed() {
        let temp = tempfile::tempdir().unwrap();
        let (suite_root, mut context) = xts_fixture(temp.path());
        context.abort_analysis("manifest download was incomplete");
        let results = ContentAnalyzer::new(vec![context])
            .with_root_dir(suite_root)
            .evaluate();
        assert!(results.has_any_tests_change());
        assert_eq!(results.analysis_failures(), 1);
    }

    #[test]
    fn test_missing_root_dir_assumes_changed() {
        let temp = tempfile::tempdir().unwrap();
        let (_suite_root, context) = xts_fixture(temp.path());
        let results = ContentAnalyzer::new(vec![context]).evaluate();
        assert!(results.has_any_tests_change());
        assert_eq!(results.analysis_failures(), 1);
    }

    #[test]
    fn test_unreadable_manifest_assumes_changed() {
        let temp = tempfile::tempdir().unwrap();
        let (suite_root, _) = xts_fixture(temp.path());
        let information = ContentInformation::new(
            temp.path().join("missing-base.json"),
            "6777",
            temp.path().join("missing-current.json"),
            "P8888",
        );
        let context =
            ContentAnalysisContext::new("android-cts.zip", information, AnalysisMethod::ModuleXts);
        let results = ContentAnalyzer::new(vec![context])
            .with_root_dir(suite_root)
            .evaluate();
        assert!(results.has_any_tests_change());
        assert_eq!(results.analysis_failures(), 1);
    }

    #[test]
    fn test_ignored_changes_suppress_diff() {
        let temp = tempfile::tempdir().unwrap();
        let (suite_root, _) = xts_fixture(temp.path());
        let information = ContentInformation::new(
            manifest(temp.path(), "base2.json", BASE),
            "6777",
            manifest(temp.path(), "current2.json", CURRENT),
            "P8888",
        );
        let context =
            ContentAnalysisContext::new("android-cts.zip", information, AnalysisMethod::ModuleXts)
                .with_ignored_changes(["android-cts/testcases/module1/someapk.apk".to_string()]);
        let results = ContentAnalyzer::new(vec![context])
            .with_root_dir(suite_root)
            .evaluate();
        assert!(!results.has_any_tests_change());
    }

    #[test]
    fn test_file_analysis_unchanged_tree() {
        let temp = tempfile::tempdir().unwrap();
        let tests_dir = temp.path().join("testsdir");
        fs::create_dir_all(tests_dir.join("DATA/app/DeviceHealthChecks")).unwrap();
        fs::write(
            tests_dir.join("DATA/app/DeviceHealthChecks/DeviceHealthChecks.apk"),
            b"apk",
        )
        .unwrap();
        let same = r#"[
          { "artifact": "mydevice-tests-8888.zip", "details": [
            { "digest": "aaaa", "path": "DATA/app/DeviceHealthChecks/DeviceHealthChecks.apk", "size": 10 }
          ] }
        ]"#;
        let information = ContentInformation::new(
            manifest(temp.path(), "base.json", same),
            "6777",
            manifest(temp.path(), "current.json", same),
            "P8888",
        );
        let context = ContentAnalysisContext::new(
            "mydevice-tests-P8888.zip",
            information,
            AnalysisMethod::File,
        );
        let results = ContentAnalyzer::new(vec![context])
            .with_root_dir(tests_dir)
            .evaluate();
        assert!(!results.has_any_tests_change());
        assert_eq!(results.unchanged_files(), 1);
    }
}
