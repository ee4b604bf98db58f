//! The trusted registry and dependency mismatch detection.
//!
//! A registry file names the URL that is supposed to serve a set of
//! (usually internal) packages:
//!
//! ```json
//! {
//!   "Url": "https://packages.acme.io/",
//!   "Dependencies": ["active_kafka", "cityhash"]
//! }
//! ```
//!
//! Any of those packages resolved from a different remote is a mismatch,
//! and a sign that a public registry could be serving a look-alike.
//!
//! Keys are matched without regard to case (`url`, `URL`, `Url` all work).
//! A missing or `null` field is left empty.

use crate::error::RegistryError;
use crate::lockfile::LockFile;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Mismatched dependency names, keyed by the remote URL they were found under.
pub type Mismatches = BTreeMap<String, Vec<String>>;

/// A trusted URL and the dependencies expected to come from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registry {
    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Dependencies")]
    pub dependencies: Vec<String>,
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut registry = Registry::default();

        for (key, value) in fields {
            if key.eq_ignore_ascii_case("url") {
                registry.url = Option::<String>::deserialize(value)
                    .map_err(de::Error::custom)?
                    .unwrap_or_default();
            } else if key.eq_ignore_ascii_case("dependencies") {
                registry.dependencies = Option::<Vec<String>>::deserialize(value)
                    .map_err(de::Error::custom)?
                    .unwrap_or_default();
            }
        }

        Ok(registry)
    }
}

impl Registry {
    pub fn new(url: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            url: url.into(),
            dependencies,
        }
    }

    /// Loads a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or isn't a valid registry
    /// document.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use depinspect::Registry;
    ///
    /// let registry = Registry::load("registry.json".as_ref())?;
    /// println!("{} packages trusted to {}", registry.dependencies.len(), registry.url);
    /// # Ok::<(), depinspect::error::RegistryError>(())
    /// ```
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Finds registry dependencies that the lock file resolved from another remote.
    ///
    /// Names are appended per remote in registry order. Remotes without a
    /// mismatch are left out of the result, and the registry's own URL never
    /// appears in it.
    ///
    /// # Example
    ///
    /// ```
    /// use depinspect::lockfile::{GemfileLock, LockFile};
    /// use depinspect::Registry;
    ///
    /// let registry = Registry::new(
    ///     "https://packages.acme.io/",
    ///     vec!["active_kafka".to_string(), "cityhash".to_string()],
    /// );
    ///
    /// let content = "GEM\n  remote: https://rubygems.org/\n  specs:\n    active_kafka (0.1.0)\n    cityhash (0.9.0)\n";
    /// let mut lock_file = GemfileLock::new();
    /// lock_file.parse(&mut content.as_bytes()).unwrap();
    ///
    /// let mismatches = registry.dependency_mismatches(&lock_file);
    /// assert_eq!(mismatches["https://rubygems.org/"], vec!["active_kafka", "cityhash"]);
    /// ```
    pub fn dependency_mismatches(&self, lock_file: &dyn LockFile) -> Mismatches {
        let mut mismatches = Mismatches::new();

        for dependency in &self.dependencies {
            for url in lock_file.remote_urls_with_dependency_mismatch(&self.url, dependency) {
                mismatches.entry(url).or_default().push(dependency.clone());
            }
        }

        mismatches
    }
}

impl std::fmt::Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} dependencies)", self.url, self.dependencies.len())
    }
}
