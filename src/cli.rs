//! CLI Tooling
//!
//! Command-line interface over the library: build a Merkle tree from a
//! directory, diff two artifact manifests, or run a full content analysis.

use crate::config::{CachetConfig, ConfigLoader};
use crate::content::{
    AnalysisMethod, ArtifactDetails, ArtifactFileDescriptor, ContentAnalysisContext,
    ContentAnalysisResults, ContentAnalyzer, ContentInformation,
};
use crate::tree;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Cachet CLI - content-addressed artifact caching and change detection
#[derive(Parser)]
#[command(name = "cachet")]
#[command(about = "Content-addressed artifact caching and change detection using Merkle trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a Merkle tree from a directory and print its root digest
    Scan {
        /// Directory to walk
        dir: PathBuf,
    },
    /// Diff two artifact manifests and list changed files
    Diff {
        /// Artifact entry to diff (build-id agnostic)
        #[arg(long)]
        artifact: String,
        /// Base manifest file
        base: PathBuf,
        /// Current manifest file
        current: PathBuf,
    },
    /// Run a content analysis and report the skip decision
    Analyze {
        /// Artifact entry to analyze
        #[arg(long)]
        artifact: String,
        /// Analysis method
        #[arg(long, value_enum)]
        method: MethodArg,
        #[arg(long)]
        base_manifest: PathBuf,
        #[arg(long)]
        base_build_id: String,
        #[arg(long)]
        current_manifest: PathBuf,
        #[arg(long)]
        current_build_id: String,
        /// Extracted artifacts root (file) or suite root (module-xts)
        #[arg(long)]
        root_dir: Option<PathBuf>,
        /// Restrict module-xts analysis to these modules
        #[arg(long = "module")]
        modules: Vec<String>,
        /// Ignore changes to these paths
        #[arg(long = "ignore")]
        ignored: Vec<String>,
    },
}

/// Analysis method CLI argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    File,
    DeviceImage,
    ModuleXts,
}

impl From<MethodArg> for AnalysisMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::File => AnalysisMethod::File,
            MethodArg::DeviceImage => AnalysisMethod::DeviceImage,
            MethodArg::ModuleXts => AnalysisMethod::ModuleXts,
        }
    }
}

/// Execution context holding the loaded configuration.
pub struct CliContext {
    config: CachetConfig,
}

impl CliContext {
    pub fn new(config_file: Option<PathBuf>) -> Result<Self> {
        let config =
            ConfigLoader::load(config_file.as_deref()).context("loading configuration")?;
        Ok(CliContext { config })
    }

    pub fn config(&self) -> &CachetConfig {
        &self.config
    }

    /// Execute a command and return its textual output.
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Scan { dir } => self.execute_scan(dir),
            Commands::Diff {
                artifact,
                base,
                current,
            } => self.execute_diff(artifact, base, current),
            Commands::Analyze {
                artifact,
                method,
                base_manifest,
                base_build_id,
                current_manifest,
                current_build_id,
                root_dir,
                modules,
                ignored,
            } => self.execute_analyze(
                artifact,
                *method,
                base_manifest,
                base_build_id,
                current_manifest,
                current_build_id,
                root_dir.as_deref(),
                modules,
                ignored,
            ),
        }
    }

    fn execute_scan(&self, dir: &Path) -> Result<String> {
        let merkle = tree::build_from_dir(dir)
            .with_context(|| format!("building merkle tree from {}", dir.display()))?;
        let mut out = String::new();
        out.push_str(&format!("{}\n\n", format_section_heading("Merkle Tree")));
        out.push_str(&format!("  Root: {}\n", dir.display()));
        out.push_str(&format!("  Root digest: {}\n", merkle.root_digest()));
        out.push_str(&format!(
            "  Unique files: {}\n",
            merkle.digest_to_file().len()
        ));
        out.push_str(&format!(
            "  Unique directories: {}\n",
            merkle.digest_to_subdir().len()
        ));
        Ok(out)
    }

    fn execute_diff(&self, artifact: &str, base: &Path, current: &Path) -> Result<String> {
        let base_details = ArtifactDetails::parse_file(base, artifact)?;
        let current_details = ArtifactDetails::parse_file(current, artifact)?;
        let diffs = ArtifactDetails::diff_contents(&base_details, &current_details);
        let mut out = String::new();
        out.push_str(&format!(
            "{}\n\n",
            format_section_heading(&format!("Changed files in {}", artifact))
        ));
        if diffs.is_empty() {
            out.push_str("No changes.\n");
            return Ok(out);
        }
        out.push_str(&format!("{}\n", format_diff_table(&diffs)));
        out.push_str(&format!("Total: {} changed files.\n", diffs.len()));
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_analyze(
        &self,
        artifact: &str,
        method: MethodArg,
        base_manifest: &Path,
        base_build_id: &str,
        current_manifest: &Path,
        current_build_id: &str,
        root_dir: Option<&Path>,
        modules: &[String],
        ignored: &[String],
    ) -> Result<String> {
        if root_dir.is_none() && !matches!(method, MethodArg::DeviceImage) {
            bail!("--root-dir is required for file and module-xts analysis");
        }
        let information = ContentInformation::new(
            base_manifest,
            base_build_id,
            current_manifest,
            current_build_id,
        );
        let ignored_paths = self
            .config
            .analysis
            .ignored_paths
            .iter()
            .chain(ignored)
            .cloned();
        let context = ContentAnalysisContext::new(artifact, information, method.into())
            .with_ignored_changes(ignored_paths);
        let mut analyzer = ContentAnalyzer::new(vec![context])
            .with_discovered_modules(modules.iter().cloned());
        if let Some(root) = root_dir {
            analyzer = analyzer.with_root_dir(root);
        }
        let results = analyzer.evaluate();
        Ok(format_analysis_text(artifact, &results))
    }
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn format_diff_table(diffs: &[ArtifactFileDescriptor]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Digest", "Size"]);
    for descriptor in diffs {
        table.add_row(vec![
            descriptor.path.clone(),
            descriptor.digest.clone(),
            descriptor.size.to_string(),
        ]);
    }
    table
}

/// Format analysis results as human-readable text.
pub fn format_analysis_text(artifact: &str, results: &ContentAnalysisResults) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Content analysis: {}", artifact))
    ));
    let decision = if results.has_any_tests_change() {
        "changed (tests must run)"
    } else {
        "unchanged (tests may be skipped)"
    };
    out.push_str(&format!("  Decision: {}\n", decision));
    out.push_str(&format!("  Unchanged files: {}\n", results.unchanged_files()));
    out.push_str(&format!("  Modified files: {}\n", results.modified_files()));
    out.push_str(&format!(
        "  Modified modules: {}\n",
        results.modified_modules()
    ));
    out.push_str(&format!(
        "  Shared folder changes: {}\n",
        results.modified_shared_folder()
    ));
    out.push_str(&format!(
        "  Analysis failures: {}\n",
        results.analysis_failures()
    ));
    if !results.unchanged_modules().is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Unchanged module"]);
        for module in results.unchanged_modules() {
            table.add_row(vec![module.clone()]);
        }
        out.push_str(&format!("\n{}\n", table));
    }
    out
}
