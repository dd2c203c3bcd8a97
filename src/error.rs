//! Error types for tree construction and manifest handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while digesting files or walking a directory tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build root is not a directory.
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },
}

/// Errors raised while setting up logging or configuration.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("logging configuration error: {0}")]
    Logging(String),
}

/// Errors raised while parsing an artifact manifest.
///
/// `ArtifactNotFound` is kept separate from `Parse`: a valid manifest with no
/// matching record is an expected, recoverable condition, while a parse
/// failure indicates a corrupt input.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest content is not valid JSON for the expected schema.
    #[error("malformed manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed but contains no record for the artifact.
    #[error("no artifact entry matching '{0}' in manifest")]
    ArtifactNotFound(String),
}
