//! JSON report files written to the output directory.
//!
//! ```text
//! <output_dir>/
//!   analyze_output/Gemfile_output.json   {"https://rubygems.org/": ["active_kafka"]}
//!   remotes_output/remotes.json          ["https://rubygems.org/", ...]
//! ```

use crate::discovery::report_stem;
use crate::error::ReportError;
use crate::registry::Mismatches;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const ANALYZE_DIR: &str = "analyze_output";
pub const REMOTES_DIR: &str = "remotes_output";
pub const REMOTES_FILE: &str = "remotes.json";

/// Writes pretty-printed JSON reports into one directory.
pub struct ReportWriter {
    dir: PathBuf,
    used_names: HashSet<String>,
}

impl ReportWriter {
    /// Creates `<output_dir>/analyze_output` and a writer for it.
    pub fn for_analyze(output_dir: &Path) -> Result<Self, ReportError> {
        Self::new(output_dir.join(ANALYZE_DIR))
    }

    /// Creates `<output_dir>/remotes_output` and a writer for it.
    pub fn for_remotes(output_dir: &Path) -> Result<Self, ReportError> {
        Self::new(output_dir.join(REMOTES_DIR))
    }

    fn new(dir: PathBuf) -> Result<Self, ReportError> {
        fs::create_dir_all(&dir).map_err(|source| ReportError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        Ok(Self {
            dir,
            used_names: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `<stem>_output.json` for a lock file's mismatches.
    ///
    /// Lock files sharing a name (e.g. two `Gemfile.lock` found recursively)
    /// get numbered reports instead of overwriting each other.
    pub fn write_mismatches(
        &mut self,
        lock_file: &Path,
        mismatches: &Mismatches,
    ) -> Result<PathBuf, ReportError> {
        let stem = report_stem(lock_file);
        let mut file_name = format!("{}_output.json", stem);
        let mut n = 2;
        while self.used_names.contains(&file_name) {
            file_name = format!("{}_{}_output.json", stem, n);
            n += 1;
        }
        self.used_names.insert(file_name.clone());

        self.write_json(&file_name, mismatches)
    }

    /// Writes `remotes.json`, a JSON array of remote URLs.
    pub fn write_remotes(&mut self, remotes: &BTreeSet<String>) -> Result<PathBuf, ReportError> {
        self.write_json(REMOTES_FILE, remotes)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, ReportError> {
        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(value)?;

        fs::write(&path, json).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "wrote report");
        Ok(path)
    }
}
