/// Configuration module for codeatlas.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_output_dir() -> String {
    "project-index".to_string()
}

fn default_max_chars_per_file() -> usize {
    32_000
}

fn default_search_limit() -> usize {
    20
}

fn default_tree_depth() -> usize {
    3
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory (relative to the project root) where artifacts are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Soft size limit for a single artifact before it is split into parts.
    #[serde(default = "default_max_chars_per_file")]
    pub max_chars_per_file: usize,

    /// Compact signature-only rendering.
    #[serde(default)]
    pub dense: bool,

    /// Default number of search results.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Depth of the directory tree on the main index page.
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_chars_per_file: default_max_chars_per_file(),
            dense: false,
            search_limit: default_search_limit(),
            tree_depth: default_tree_depth(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; invalid JSON warns and falls
    /// back to the defaults rather than aborting the run.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "codeatlas.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.max_chars_per_file > 0,
            "max_chars_per_file must be positive"
        );
        anyhow::ensure!(self.search_limit > 0, "search_limit must be positive");
        anyhow::ensure!(self.tree_depth > 0, "tree_depth must be positive");
        anyhow::ensure!(
            !self.output_dir.is_empty() && !self.output_dir.contains("/"),
            "output_dir must be a single directory name"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, "project-index");
        assert_eq!(config.max_chars_per_file, 32_000);
        assert_eq!(config.search_limit, 20);
        assert_eq!(config.tree_depth, 3);
        assert!(!config.dense);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"output_dir": "atlas", "dense": true}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.output_dir, "atlas");
        assert!(config.dense);
        // Other fields should have defaults
        assert_eq!(config.max_chars_per_file, 32_000);
        assert_eq!(config.search_limit, 20);
    }

    #[test]
    fn test_validate_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_values() {
        let mut config = Config::default();
        config.max_chars_per_file = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output_dir = "a/b".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("codeatlas.json");
        let path_str = path.to_str().unwrap();

        let mut config = Config::default();
        config.dense = true;
        config.max_chars_per_file = 16_000;
        config.save(path_str).unwrap();

        let loaded = Config::load(path_str).unwrap();
        assert!(loaded.dense);
        assert_eq!(loaded.max_chars_per_file, 16_000);
        assert_eq!(loaded.output_dir, "project-index");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.output_dir, config.output_dir);
        assert_eq!(parsed.max_chars_per_file, config.max_chars_per_file);
    }
}
