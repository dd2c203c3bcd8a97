//! Configuration loading.
//!
//! Composes defaults, an optional configuration file, and `CACHET__`-prefixed
//! environment variables (highest precedence) into a [`CachetConfig`].

use crate::logging::LoggingConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis defaults applied to every context built by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Paths whose changes are always ignored during analysis.
    #[serde(default)]
    pub ignored_paths: Vec<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachetConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    /// Precedence: defaults (lowest) -> file -> environment (highest).
    pub fn load(file: Option<&Path>) -> Result<CachetConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        let builder = builder.add_source(
            Environment::with_prefix("CACHET")
                .separator("__")
                .try_parsing(true),
        );
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ConfigLoader::load(None).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.analysis.ignored_paths.is_empty());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachet.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"debug\"").unwrap();
        writeln!(file, "[analysis]").unwrap();
        writeln!(file, "ignored_paths = [\"tools/version.txt\"]").unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.analysis.ignored_paths, vec!["tools/version.txt"]);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = ConfigLoader::load(Some(Path::new("/nonexistent/cachet.toml")));
        assert!(result.is_err());
    }
}
