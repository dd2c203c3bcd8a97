//! Artifact content analysis.
//!
//! Parses artifact manifests, diffs base and current snapshots, and decides
//! which modules or files a test execution must account for as changed.

pub mod analyzer;
pub mod artifact_details;
pub mod context;
pub mod device_tree;
pub mod results;

pub use analyzer::ContentAnalyzer;
pub use artifact_details::{ArtifactDetails, ArtifactFileDescriptor};
pub use context::{AnalysisMethod, ContentAnalysisContext, ContentInformation};
pub use results::ContentAnalysisResults;
