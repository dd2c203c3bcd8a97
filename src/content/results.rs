//! Aggregated outcome of a content analysis run.

use std::collections::BTreeSet;

/// Accumulated per-run analysis counters and the unchanged-module set.
///
/// Created fresh per analyzer run. The skip decision downstream consumers may
/// rely on is [`has_any_tests_change`] plus [`unchanged_modules`].
///
/// [`has_any_tests_change`]: ContentAnalysisResults::has_any_tests_change
/// [`unchanged_modules`]: ContentAnalysisResults::unchanged_modules
#[derive(Debug, Default)]
pub struct ContentAnalysisResults {
    unchanged_files: u64,
    modified_files: u64,
    modified_modules: u64,
    unchanged_modules: BTreeSet<String>,
    modified_shared_folder: u64,
    device_image_changes: u64,
    analysis_failures: u64,
}

impl ContentAnalysisResults {
    pub fn new() -> Self {
        ContentAnalysisResults::default()
    }

    pub fn add_unchanged_file(&mut self) {
        self.unchanged_files += 1;
    }

    pub fn add_modified_file(&mut self) {
        self.modified_files += 1;
    }

    pub fn add_modified_module(&mut self) {
        self.modified_modules += 1;
    }

    pub fn add_unchanged_module(&mut self, name: impl Into<String>) {
        self.unchanged_modules.insert(name.into());
    }

    pub fn add_modified_shared_folder(&mut self, count: u64) {
        self.modified_shared_folder += count;
    }

    pub fn add_device_image_changes(&mut self, count: u64) {
        self.device_image_changes += count;
    }

    /// Record a context that could not be analyzed. Failures force
    /// [`has_any_tests_change`] to true: uncertainty must never turn into a
    /// test skip.
    ///
    /// [`has_any_tests_change`]: ContentAnalysisResults::has_any_tests_change
    pub fn add_analysis_failure(&mut self) {
        self.analysis_failures += 1;
    }

    /// True iff at least one context reported a change, or any analysis
    /// failed.
    pub fn has_any_tests_change(&self) -> bool {
        self.modified_files > 0
            || self.modified_modules > 0
            || self.modified_shared_folder > 0
            || self.device_image_changes > 0
            || self.analysis_failures > 0
    }

    pub fn device_image_changed(&self) -> bool {
        self.device_image_changes > 0
    }

    /// Modules diffed and found unchanged; usable as a skip-list.
    pub fn unchanged_modules(&self) -> &BTreeSet<String> {
        &self.unchanged_modules
    }

    pub fn unchanged_files(&self) -> u64 {
        self.unchanged_files
    }

    pub fn modified_files(&self) -> u64 {
        self.modified_files
    }

    pub fn modified_modules(&self) -> u64 {
        self.modified_modules
    }

    pub fn modified_shared_folder(&self) -> u64 {
        self.modified_shared_folder
    }

    pub fn analysis_failures(&self) -> u64 {
        self.analysis_failures
    }

    /// Fold several per-run results into one.
    pub fn merge(results: impl IntoIterator<Item = ContentAnalysisResults>) -> Self {
        let mut merged = ContentAnalysisResults::new();
        for result in results {
            merged.unchanged_files += result.unchanged_files;
            merged.modified_files += result.modified_files;
            merged.modified_modules += result.modified_modules;
            merged.unchanged_modules.extend(result.unchanged_modules);
            merged.modified_shared_folder += result.modified_shared_folder;
            merged.device_image_changes += result.device_image_changes;
            merged.analysis_failures += result.analysis_failures;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_results_report_no_change() {
        let results = ContentAnalysisResults::new();
        assert!(!results.has_any_tests_change());
    }

    #[test]
    fn test_unchanged_accumulation_reports_no_change() {
        let mut results = ContentAnalysisResults::new();
        results.add_unchanged_file();
        results.add_unchanged_module("module1");
        assert!(!results.has_any_tests_change());
        assert!(results.unchanged_modules().contains("module1"));
    }

    #[test]
    fn test_any_modification_reports_change() {
        let mut results = ContentAnalysisResults::new();
        results.add_modified_file();
        assert!(results.has_any_tests_change());
    }

    #[test]
    fn test_failure_forces_change() {
        let mut results = ContentAnalysisResults::new();
        results.add_unchanged_file();
        results.add_analysis_failure();
        assert!(results.has_any_tests_change());
    }

    #[test]
    fn test_merge_sums_counters_and_unions_modules() {
        let mut a = ContentAnalysisResults::new();
        a.add_unchanged_module("module1");
        a.add_modified_file();
        let mut b = ContentAnalysisResults::new();
        b.add_unchanged_module("module2");
        b.add_device_image_changes(2);

        let merged = ContentAnalysisResults::merge([a, b]);
        assert_eq!(merged.modified_files(), 1);
        assert!(merged.device_image_changed());
        assert_eq!(merged.unchanged_modules().len(), 2);
        assert!(merged.has_any_tests_change());
    }
}
