use crate::registry::{Mismatches, Registry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Mismatches found in one lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMismatches {
    pub lock_file: PathBuf,
    pub mismatches: Mismatches,
    /// Where the JSON report for this file was written, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl FileMismatches {
    pub fn count(&self) -> usize {
        self.mismatches.values().map(Vec::len).sum()
    }
}

/// Outcome of an `analyze` run over a set of lock files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub registry: Registry,
    pub files_scanned: usize,
    pub files_skipped: usize,
    /// Only files with at least one mismatch are listed.
    pub files: Vec<FileMismatches>,
    pub scan_time: DateTime<Utc>,
}

impl AnalyzeResult {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            files_scanned: 0,
            files_skipped: 0,
            files: Vec::new(),
            scan_time: Utc::now(),
        }
    }

    pub fn has_mismatches(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn mismatch_count(&self) -> usize {
        self.files.iter().map(FileMismatches::count).sum()
    }
}

/// Outcome of a `remotes` run: the union of matching remote URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotesResult {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub remotes: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    pub scan_time: DateTime<Utc>,
}

impl RemotesResult {
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            files_skipped: 0,
            remotes: BTreeSet::new(),
            report_path: None,
            scan_time: Utc::now(),
        }
    }
}

impl Default for RemotesResult {
    fn default() -> Self {
        Self::new()
    }
}
