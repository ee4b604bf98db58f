//! Configuration file handling.
//!
//! This module provides loading and saving of depinspect configuration
//! from a TOML file. Command-line flags always win over the file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/depinspect/config.toml`
//! - macOS: `~/Library/Application Support/depinspect/config.toml`
//! - Windows: `%APPDATA%\depinspect\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! registry = "registries/ruby.json"
//! output_dir = "reports"
//! default_format = "table"
//! recursive = false
//! fail_on_mismatch = true
//!
//! [ignore]
//! files = ["vendor-*.lock"]
//! dependencies = ["@acme/public-*"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::registry::Mismatches;

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use depinspect::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Registry: {}", config.registry.display());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry file used by `analyze` when `--registry` isn't given.
    ///
    /// Default: `registry.json`
    pub registry: PathBuf,

    /// Directory the `analyze_output/` and `remotes_output/` folders are
    /// created in.
    ///
    /// Default: the current directory
    pub output_dir: PathBuf,

    /// Default summary format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Whether to search directories recursively for lock files.
    ///
    /// Default: false
    pub recursive: bool,

    /// Whether `analyze` exits with a failure code when it finds mismatches.
    ///
    /// Default: false
    pub fail_on_mismatch: bool,

    /// Ignore list configuration for suppressing known issues.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Configuration for ignoring specific lock files or dependencies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Lock file names to skip during discovery.
    ///
    /// Supports glob patterns (e.g., "vendor-*.lock").
    pub files: Vec<String>,

    /// Dependency names whose mismatches are accepted risks.
    ///
    /// Supports glob patterns (e.g., "@acme/public-*").
    pub dependencies: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a lock file should be skipped.
    pub fn should_ignore_file(&self, file_name: &str) -> bool {
        matches_any(&self.files, file_name)
    }

    /// Check if a dependency's mismatches should be dropped.
    pub fn should_ignore_dependency(&self, name: &str) -> bool {
        matches_any(&self.dependencies, name)
    }

    /// Removes ignored dependencies, and any remote left without mismatches.
    pub fn filter_mismatches(&self, mismatches: &mut Mismatches) {
        if self.dependencies.is_empty() {
            return;
        }

        for names in mismatches.values_mut() {
            names.retain(|name| !self.should_ignore_dependency(name));
        }
        mismatches.retain(|_, names| !names.is_empty());
    }
}

fn matches_any(patterns: &[String], name: &str) -> bool {
    patterns.iter().any(|pattern| name_matches(pattern, name))
}

/// Matches a file or dependency name against a pattern in which `*` stands
/// for any run of characters, including none. Everything else is literal.
fn name_matches(pattern: &str, name: &str) -> bool {
    let mut pieces = pattern.split('*');
    let head = pieces.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(head) else {
        return false;
    };

    let mut pieces: Vec<&str> = pieces.collect();
    let Some(tail) = pieces.pop() else {
        return rest.is_empty();
    };

    // Inner pieces take their leftmost occurrence; the tail is anchored at the end.
    for piece in pieces {
        match rest.find(piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }

    rest.ends_with(tail)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: PathBuf::from("registry.json"),
            output_dir: PathBuf::from("."),
            default_format: "table".to_string(),
            recursive: false,
            fail_on_mismatch: false,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use depinspect::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("depinspect/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depinspect")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_exact() {
        assert!(name_matches("Gemfile.lock", "Gemfile.lock"));
        assert!(!name_matches("Gemfile.lock", "yarn.lock"));
    }

    #[test]
    fn test_name_matches_prefix_and_suffix() {
        assert!(name_matches("vendor-*", "vendor-api.lock"));
        assert!(name_matches("*.lock", "yarn.lock"));
        assert!(!name_matches("*.lock", "yarn.lock.bak"));
    }

    #[test]
    fn test_name_matches_contains() {
        assert!(name_matches("*legacy*", "billing-legacy-Gemfile.lock"));
        assert!(!name_matches("*legacy*", "billing.lock"));
    }

    #[test]
    fn test_name_matches_scoped() {
        assert!(name_matches("@acme/*", "@acme/design-system"));
        assert!(!name_matches("@acme/*", "@babel/core"));
    }

    #[test]
    fn test_name_matches_inner_pieces_in_order() {
        assert!(name_matches("a*b*c", "a-b-c"));
        assert!(name_matches("a*b*c", "abc"));
        assert!(!name_matches("a*b*c", "a-c-b"));
        assert!(!name_matches("ab*ba", "aba"));
        assert!(name_matches("*", ""));
        assert!(name_matches("**", "anything"));
    }

    #[test]
    fn test_ignore_files() {
        let config = IgnoreConfig {
            files: vec!["vendor-*.lock".to_string(), "old.lock".to_string()],
            dependencies: vec![],
        };

        assert!(config.should_ignore_file("vendor-payments.lock"));
        assert!(config.should_ignore_file("old.lock"));
        assert!(!config.should_ignore_file("Gemfile.lock"));
    }

    #[test]
    fn test_filter_mismatches_drops_empty_remotes() {
        let config = IgnoreConfig {
            files: vec![],
            dependencies: vec!["@acme/public-*".to_string()],
        };

        let mut mismatches = Mismatches::new();
        mismatches.insert(
            "https://registry.yarnpkg.com".to_string(),
            vec!["@acme/public-icons".to_string()],
        );
        mismatches.insert(
            "https://registry.npmjs.org".to_string(),
            vec!["@acme/public-icons".to_string(), "@acme/auth".to_string()],
        );

        config.filter_mismatches(&mut mismatches);

        assert!(!mismatches.contains_key("https://registry.yarnpkg.com"));
        assert_eq!(
            mismatches["https://registry.npmjs.org"],
            vec!["@acme/auth".to_string()]
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.registry, PathBuf::from("registry.json"));
        assert_eq!(config.default_format, "table");
        assert!(!config.recursive);
        assert!(!config.fail_on_mismatch);
        assert!(config.ignore.files.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("fail_on_mismatch = true\n[ignore]\nfiles = [\"a.lock\"]\n").unwrap();

        assert!(config.fail_on_mismatch);
        assert_eq!(config.default_format, "table");
        assert_eq!(config.ignore.files, vec!["a.lock".to_string()]);
    }
}
